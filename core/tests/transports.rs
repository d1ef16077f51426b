/*
 * transports.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for URL-selected transports. The HTTP transport runs
 * against a loopback server thread that answers like a database server;
 * the datagram transports against local sockets.
 *
 * Run with:
 *   cargo test -p fluxwire_core --test transports
 */

use std::io::{Read, Write};
use std::net::{TcpListener, UdpSocket};
use std::thread;
use std::time::Duration;

use fluxwire_core::transport::HttpTransport;
use fluxwire_core::{from_url, ClientConfig, Transport, TransportError};

/// Accept one connection, return the request head and body, answer with `response`.
fn answer_once(response: &'static [u8]) -> (u16, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut data = Vec::new();
        let mut buf = [0u8; 2048];
        loop {
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let len = text[..end]
                    .lines()
                    .find_map(|l| l.strip_prefix("Content-Length: "))
                    .map(|v| v.parse::<usize>().unwrap())
                    .unwrap_or(0);
                if data.len() >= end + 4 + len {
                    break;
                }
            }
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response).unwrap();
        String::from_utf8(data).unwrap()
    });
    (port, handle)
}

#[test]
fn http_write_posts_line_protocol() {
    let (port, server) = answer_once(b"HTTP/1.1 204 No Content\r\nX-Influxdb-Version: 1.8.10\r\n\r\n");
    let url = format!("http://127.0.0.1:{}?db=telemetry", port);
    let transport = from_url(&url, &ClientConfig::default()).unwrap();
    transport.send(b"cpu,host=a usage=0.5 1700000000000000000").unwrap();

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /write?db=telemetry HTTP/1.1\r\n"), "{}", request);
    assert!(request.contains("Content-Length: 40\r\n"));
    assert!(request.ends_with("\r\n\r\ncpu,host=a usage=0.5 1700000000000000000"));
}

#[test]
fn http_write_rejected_by_server() {
    let (port, server) = answer_once(
        b"HTTP/1.1 400 Bad Request\r\nContent-Length: 31\r\n\r\n{\"error\":\"unable to parse 'x'\"}",
    );
    let t = HttpTransport::from_url(&format!("http://127.0.0.1:{}?db=telemetry", port), ClientConfig::default())
        .unwrap();
    let err = t.send(b"x").unwrap_err();
    match err {
        TransportError::Status { code, body } => {
            assert_eq!(code, 400);
            assert!(body.contains("unable to parse"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.join().unwrap();
}

#[test]
fn http_query_encodes_statement() {
    let (port, server) = answer_once(
        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\nd\r\n{\"results\":[]\r\n1\r\n}\r\n0\r\n\r\n",
    );
    let t = HttpTransport::from_url(&format!("http://127.0.0.1:{}/?db=my%20db", port), ClientConfig::default())
        .unwrap();
    let body = t.query("SELECT mean(\"usage\") FROM cpu WHERE host = 'a'").unwrap();
    assert_eq!(body, "{\"results\":[]}");

    let request = server.join().unwrap();
    let request_line = request.lines().next().unwrap();
    assert_eq!(
        request_line,
        "GET /query?db=my%20db&q=SELECT%20mean(%22usage%22)%20FROM%20cpu%20WHERE%20host%20%3D%20'a' HTTP/1.1"
    );
}

#[test]
fn http_ping_reports_version() {
    let (port, server) = answer_once(b"HTTP/1.1 204 No Content\r\nX-Influxdb-Version: 1.8.10\r\nContent-Length: 0\r\n\r\n");
    let t = HttpTransport::from_url(&format!("http://127.0.0.1:{}?db=x", port), ClientConfig::default()).unwrap();
    assert_eq!(t.ping().unwrap().as_deref(), Some("1.8.10"));
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /ping HTTP/1.1\r\n"));
}

#[test]
fn http_create_database() {
    let (port, server) = answer_once(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n{}");
    let t = HttpTransport::from_url(&format!("http://127.0.0.1:{}?db=telemetry", port), ClientConfig::default())
        .unwrap();
    t.create_database().unwrap();
    let request = server.join().unwrap();
    assert!(request.starts_with("POST /query?q=CREATE%20DATABASE%20%22telemetry%22 HTTP/1.1\r\n"));
}

#[test]
fn udp_url_delivers_datagram() {
    let server = UdpSocket::bind("127.0.0.1:0").unwrap();
    server.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let port = server.local_addr().unwrap().port();

    let transport = from_url(&format!("udp://127.0.0.1:{}", port), &ClientConfig::default()).unwrap();
    transport.send(b"mem free=1024i").unwrap();

    let mut buf = [0u8; 128];
    let (n, _) = server.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"mem free=1024i");
}

#[cfg(unix)]
#[test]
fn unix_url_delivers_datagram() {
    use std::os::unix::net::UnixDatagram;

    let path = std::env::temp_dir().join(format!("fluxwire-it-{}.sock", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let server = UnixDatagram::bind(&path).unwrap();
    server.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    let transport = from_url(&format!("unix://{}", path.display()), &ClientConfig::default()).unwrap();
    transport.send(b"disk used=7i").unwrap();

    let mut buf = [0u8; 128];
    let n = server.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"disk used=7i");
    let _ = std::fs::remove_file(&path);
}
