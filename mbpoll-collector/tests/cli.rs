//! End-to-end tests driving the built `mbpoll` binary.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

const VERSION_OK: &str = r#"{"status":200,"value":{"agent":"2.0.3","protocol":"7.2"}}"#;
const UNKNOWN_OBJECT: &str = concat!(
    r#"{"status":404,"error_type":"javax.management.InstanceNotFoundException","#,
    r#""error":"javax.management.InstanceNotFoundException : a:b=c"}"#
);

fn mbpoll(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mbpoll"))
        .args(args)
        .env_remove("MBPOLL_FILE")
        .env_remove("MBPOLL_USER")
        .env_remove("MBPOLL_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .expect("run mbpoll")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf8 stderr")
}

/// Answer one connection per canned body with HTTP 200, then stop.
/// Returns the agent address and the number of requests served.
fn serve(bodies: Vec<&'static str>) -> (String, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();

    let handle = thread::spawn(move || {
        let mut served = 0;
        for body in bodies {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("content length");
                    }
                }
            }
            let mut request = vec![0; content_length];
            reader.read_exact(&mut request).expect("read body");

            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .expect("write response");
            stream.flush().expect("flush");
            served += 1;
        }
        served
    });

    (addr, handle)
}

/// An address nothing listens on.
fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();
    drop(listener);
    addr
}

// ===========================================
// Configuration errors (exit 1)
// ===========================================

#[test]
fn test_blank_endpoint_exits_1() {
    let output = mbpoll(&[" "]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("endpoint must not be blank"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_endpoint_exits_1() {
    let output = mbpoll(&[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_0() {
    let output = mbpoll(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn test_help_names_header_file_as_clean_channel() {
    let output = mbpoll(&["--help"]);
    assert!(stdout(&output).contains("this file is the clean header channel"));
}

#[test]
fn test_huge_timeout_exits_1_without_panicking() {
    let addr = closed_address();
    let output = mbpoll(&["--timeout-sec", "18446744073709551615", addr.as_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("timeout-sec must be between 1 and 86400"));
}

#[test]
fn test_non_numeric_interval_exits_1() {
    let addr = closed_address();
    let output = mbpoll(&[addr.as_str(), "a:b=c", "X", "soon"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("soon"));
}

#[test]
fn test_malformed_batch_exits_1_before_connecting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let batch = dir.path().join("batch.tsv");
    std::fs::write(&batch, "a:b=c\tX\textra\n").expect("write batch");

    // Nothing listens here; a connection attempt would exit 2 instead.
    let addr = closed_address();
    let output = mbpoll(&["--file", batch.to_str().expect("utf8 path"), addr.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("invalid batch file"));
    assert!(err.contains("line 1"));
}

#[test]
fn test_missing_batch_file_exits_1() {
    let dir = tempfile::tempdir().expect("tempdir");
    let batch = dir.path().join("absent.tsv");
    let addr = closed_address();
    let output = mbpoll(&["--file", batch.to_str().expect("utf8 path"), addr.as_str()]);
    assert_eq!(output.status.code(), Some(1));
}

// ===========================================
// Runtime errors (exit 2)
// ===========================================

#[test]
fn test_connection_refused_exits_2() {
    let addr = closed_address();
    let output = mbpoll(&[addr.as_str(), "java.lang:type=Memory", "HeapMemoryUsage"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.starts_with("error: cannot connect to management endpoint"));
    assert!(err.contains("caused by:"));
}

#[test]
fn test_unknown_object_exits_2_without_rows() {
    let (addr, server) = serve(vec![
        VERSION_OK,
        UNKNOWN_OBJECT,
    ]);

    let output = mbpoll(&[addr.as_str(), "a:b=c", "X"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("cannot find object name [a:b=c]"));
    assert_eq!(server.join().expect("server"), 2);
}

// ===========================================
// Successful runs
// ===========================================

#[test]
fn test_single_shot_row_on_stdout_header_on_stderr() {
    let (addr, server) = serve(vec![
        VERSION_OK,
        r#"{"status":200,"value":{"y":2,"x":1}}"#,
        r#"{"status":200,"value":"hi"}"#,
    ]);

    let output = mbpoll(&[addr.as_str(), "o1:k=1", "A1,A2"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "1,2,hi\n");
    assert_eq!(stderr(&output), "A1@x,A1@y,A2\n");
    assert_eq!(server.join().expect("server"), 3);
}

#[test]
fn test_batch_with_header_file() {
    let (addr, server) = serve(vec![
        VERSION_OK,
        r#"{"status":200,"value":[1,[2,3]]}"#,
        r#"{"status":200,"value":null}"#,
    ]);
    let dir = tempfile::tempdir().expect("tempdir");
    let batch = dir.path().join("batch.tsv");
    let header = dir.path().join("header.csv");
    std::fs::write(&batch, "\"o1:k=1\"\tList\r\n\r\no2:k=2\tMaybe\r\n").expect("write batch");

    let output = mbpoll(&[
        "--file",
        batch.to_str().expect("utf8 path"),
        "--header-file",
        header.to_str().expect("utf8 path"),
        addr.as_str(),
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "[1, [2, 3]],null\n");
    assert!(output.stderr.is_empty());
    assert_eq!(std::fs::read_to_string(&header).expect("header"), "List,Maybe\n");
    assert_eq!(server.join().expect("server"), 3);
}

#[test]
fn test_listing_sorted_on_stdout() {
    let (addr, server) = serve(vec![
        VERSION_OK,
        r#"{"status":200,"value":["Z:type=a","A:type=a","M:type=a"]}"#,
    ]);

    let output = mbpoll(&[addr.as_str()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "A:type=a\nM:type=a\nZ:type=a\n");
    assert!(output.stderr.is_empty());
    assert_eq!(server.join().expect("server"), 2);
}
