//! Drive the caltool binary the way xcal does: calendar on stdin, result on
//! stdout, diagnostics on stderr.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const CALTOOL: &str = env!("CARGO_BIN_EXE_caltool");

const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//xcal//test//EN\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Meeting\r\n\
DTSTART:20160404T093000\r\n\
ORGANIZER;CN=Jo:mailto:jo@example.com\r\n\
X-TEST:1\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
SUMMARY:Buy milk\r\n\
DUE:20160406T170000\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

fn caltool(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(CALTOOL)
        .args(args)
        .env_remove("DATEMSK")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_info() {
    let output = caltool(&["-info"], ICS);
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "14 lines\n\
2 components: 1 event, 1 todo, 0 others\n\
0 subcomponents\n\
8 properties\n\
From 2016-Apr-04 to 2016-Apr-06\n\
Organizers:\n\
Jo\n"
    );
}

#[test]
fn test_extract() {
    let output = caltool(&["-extract", "e"], ICS);
    assert_eq!(stdout(&output), "2016-Apr-04  9:30 AM: Meeting\n");

    let output = caltool(&["-extract", "x"], ICS);
    assert_eq!(stdout(&output), "X-TEST\n");
    assert!(output.status.success());
}

#[test]
fn test_filter_to_dos() {
    let output = caltool(&["-filter", "t", "from", "2016-04-01", "to", "2016-04-30"], ICS);
    assert!(stderr(&output).is_empty());
    let text = stdout(&output);
    assert!(text.contains("SUMMARY:Buy milk\r\n"));
    assert!(!text.contains("Meeting"));
}

#[test]
fn test_filter_reversed_range_fails() {
    let output = caltool(&["-filter", "e", "from", "2016-05-01", "to", "2016-04-01"], ICS);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must occur earlier"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_combine() {
    let dir = tempfile::tempdir().unwrap();
    let other = dir.path().join("other.ics");
    std::fs::write(
        &other,
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//other//EN\r\n\
BEGIN:VJOURNAL\r\nSUMMARY:Notes\r\nEND:VJOURNAL\r\nEND:VCALENDAR\r\n",
    )
    .unwrap();

    let output = caltool(&["-combine", other.to_str().unwrap()], ICS);
    assert!(stderr(&output).is_empty());
    let text = stdout(&output);
    let journal = text.find("BEGIN:VJOURNAL").unwrap();
    let event = text.find("BEGIN:VEVENT").unwrap();
    assert!(journal < event);
    assert_eq!(text.matches("PRODID").count(), 1);
}

#[test]
fn test_bad_input_reports_on_stderr() {
    let output = caltool(&["-info"], "BEGIN:VCALENDAR\r\nPRODID:x\r\nEND:VCALENDAR\r\n");
    assert!(!output.status.success());
    assert!(!stderr(&output).is_empty());
    assert!(stdout(&output).is_empty());

    let output = caltool(&["-bogus"], ICS);
    assert!(stderr(&output).contains("not a valid argument"));
}
