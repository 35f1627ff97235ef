mod outcome;
mod preferences;
mod protocol;
mod router;
mod support;
