use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that the Display form is "[file:line:column]" with the bare file name.
///
/// **WHY THIS MATTERS**: Every error message in the workspace ends with this suffix. Full
/// source paths would bloat the messages that end up in the host log.
///
/// **BUG THIS CATCHES**: Would catch if `file_name()` stops stripping directories or the
/// bracketed format changes.
#[test]
#[track_caller]
fn given_error_location_when_formatted_then_shows_file_name_line_and_column() {
    // GIVEN: A location captured here
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{}", location);

    // THEN: Bracketed, with bare file name and both coordinates
    assert!(formatted.starts_with("[error_location.rs:"));
    assert!(formatted.ends_with(']'));
    assert!(formatted.contains(&format!(":{}:", location.line)));
    assert!(!formatted.contains('/'), "Directories should be stripped");
}

/// **VALUE**: Verifies that `#[track_caller]` helpers record their caller's line.
///
/// **BUG THIS CATCHES**: Would catch error constructors that report their own position
/// instead of the code that failed.
#[test]
fn given_track_caller_helper_when_called_twice_then_lines_differ() {
    #[track_caller]
    fn capture() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    let first = capture();
    let second = capture();

    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}

#[test]
fn given_windows_style_path_when_file_name_then_strips_backslashes() {
    let location = ErrorLocation {
        file: "src\\pipeline\\mod.rs",
        line: 3,
        column: 9,
    };

    assert_eq!(location.file_name(), "mod.rs");
    assert_eq!(location.to_string(), "[mod.rs:3:9]");
}
