//! Purpose: Run the fixed client-side demonstration against a sum server.
//! Exports: `DemoCase`, `DemoReport`, `DEMO_CASES`, `run_demo`.
//! Role: Exercises both numeric representations end to end and reports results.
//! Invariants: Any request failure ends the run; there is no retry.

use std::fmt::Display;

use tracing::warn;

use super::remote::RemoteClient;
use crate::core::error::Error;
use crate::core::numeric::NumericArray;

/// One request sent by the demo, with the sum it expects back.
#[derive(Clone, Copy, Debug)]
pub enum DemoCase {
    Integers {
        input: &'static [i64],
        expected: f64,
    },
    Reals {
        input: &'static [f64],
        expected: f64,
    },
}

pub const DEMO_CASES: [DemoCase; 2] = [
    DemoCase::Integers {
        input: &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 14, 15],
        expected: 96.0,
    },
    DemoCase::Reals {
        input: &[1.9, 2.8, 3.7, 4.6, 5.5, 6.4, 7.3, 8.2, 9.1],
        expected: 49.0,
    },
];

impl DemoCase {
    pub fn expected(self) -> f64 {
        match self {
            DemoCase::Integers { expected, .. } | DemoCase::Reals { expected, .. } => expected,
        }
    }

    pub fn array(self) -> NumericArray {
        match self {
            DemoCase::Integers { input, .. } => NumericArray::Integer(input.to_vec()),
            DemoCase::Reals { input, .. } => NumericArray::Real(input.to_vec()),
        }
    }

    fn render_input(self) -> String {
        match self {
            DemoCase::Integers { input, .. } => render_values(input),
            DemoCase::Reals { input, .. } => render_values(input),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemoReport {
    pub input: String,
    pub expected: f64,
    pub sum: f64,
}

impl DemoReport {
    pub fn summary_line(&self) -> String {
        format!("sum of {} = {:.2}", self.input, self.sum)
    }

    pub fn is_match(&self) -> bool {
        self.sum == self.expected
    }
}

pub fn run_demo(client: &RemoteClient) -> Result<Vec<DemoReport>, Error> {
    DEMO_CASES
        .iter()
        .map(|case| run_case(client, *case))
        .collect()
}

fn run_case(client: &RemoteClient, case: DemoCase) -> Result<DemoReport, Error> {
    let response = client.sum(&case.array())?;
    let report = DemoReport {
        input: case.render_input(),
        expected: case.expected(),
        sum: response.sum,
    };
    if !report.is_match() {
        warn!(
            sum = report.sum,
            expected = report.expected,
            "output does not match"
        );
    }
    Ok(report)
}

fn render_values<T: Display>(values: &[T]) -> String {
    let parts = values.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("[{}]", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{DEMO_CASES, DemoReport, render_values, run_demo};
    use crate::api::{ErrorKind, RemoteClient};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Answers each connection with the next canned sum and returns the
    /// request bodies it saw.
    fn canned_server(sums: &'static [f64]) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = thread::spawn(move || {
            let mut bodies = Vec::new();
            for sum in sums {
                let (stream, _) = listener.accept().expect("accept");
                bodies.push(answer(stream, &format!("{{\"sum\":{sum:?}}}")));
            }
            bodies
        });
        (format!("http://{addr}/sum"), handle)
    }

    fn answer(stream: TcpStream, body: &str) -> String {
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("length");
                }
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).expect("read body");

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write response");
        String::from_utf8(request_body).expect("utf8 body")
    }

    #[test]
    fn demo_reports_each_case() {
        let (url, server) = canned_server(&[96.0, 49.0]);
        let client = RemoteClient::new(url).expect("client");

        let reports = run_demo(&client).expect("demo");
        let lines = reports
            .iter()
            .map(DemoReport::summary_line)
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "sum of [1 2 3 4 5 6 7 8 9 10 12 14 15] = 96.00",
                "sum of [1.9 2.8 3.7 4.6 5.5 6.4 7.3 8.2 9.1] = 49.00",
            ]
        );
        assert!(reports.iter().all(DemoReport::is_match));

        let bodies = server.join().expect("server thread");
        assert_eq!(bodies[0], r#"{"input":[1,2,3,4,5,6,7,8,9,10,12,14,15]}"#);
        assert_eq!(bodies[1], r#"{"input":[1.9,2.8,3.7,4.6,5.5,6.4,7.3,8.2,9.1]}"#);
    }

    #[test]
    fn mismatched_sum_is_reported_not_fatal() {
        let (url, server) = canned_server(&[95.0, 49.0]);
        let client = RemoteClient::new(url).expect("client");

        let reports = run_demo(&client).expect("demo");
        assert!(!reports[0].is_match());
        assert!(reports[1].is_match());
        assert_eq!(
            reports[0].summary_line(),
            "sum of [1 2 3 4 5 6 7 8 9 10 12 14 15] = 95.00"
        );
        server.join().expect("server thread");
    }

    #[test]
    fn unreachable_server_ends_the_run() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = RemoteClient::new(format!("http://127.0.0.1:{port}")).expect("client");
        let err = run_demo(&client).expect_err("transport failure");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn demo_cases_resolve_to_both_representations() {
        let kinds = DEMO_CASES
            .iter()
            .map(|case| case.array().kind())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                crate::api::NumericKind::Integer,
                crate::api::NumericKind::Real
            ]
        );
    }

    #[test]
    fn values_render_space_separated() {
        assert_eq!(render_values::<i64>(&[]), "[]");
        assert_eq!(render_values(&[1.0f64, 2.5]), "[1 2.5]");
    }
}
