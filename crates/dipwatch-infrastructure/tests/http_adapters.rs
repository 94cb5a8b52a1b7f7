use dipwatch_domain::repositories::mail::MailTransport;
use dipwatch_domain::repositories::market_data::PriceHistorySource;
use dipwatch_domain::value_objects::email::EmailMessage;
use dipwatch_infrastructure::mail::mailgun::MailgunTransport;
use dipwatch_infrastructure::market_data::yahoo::YahooChartClient;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

const DROP_CONNECTION: u16 = 0;

/// Serves canned responses in order and records every raw request.
/// A status of `DROP_CONNECTION` closes the socket without answering.
struct MockHttpServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockHttpServer {
    fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);
        let stop = Arc::new(AtomicBool::new(false));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop_clone = stop.clone();
        let requests_clone = requests.clone();

        let handle = thread::spawn(move || {
            listener.set_nonblocking(true).expect("nonblocking");
            let mut queue: VecDeque<(u16, String)> = responses.into();
            while !stop_clone.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        let (status, body) = queue
                            .pop_front()
                            .unwrap_or((500, "no more responses".to_string()));
                        let _ = handle_connection(&mut stream, status, &body, &requests_clone);
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => {
                        thread::sleep(Duration::from_millis(10));
                    }
                }
            }
        });

        Self {
            base_url,
            requests,
            stop,
            handle: Some(handle),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

fn handle_connection(
    stream: &mut TcpStream,
    status: u16,
    body: &str,
    requests: &Mutex<Vec<String>>,
) -> Result<(), String> {
    stream.set_nonblocking(false).map_err(|e| e.to_string())?;
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .map_err(|e| e.to_string())?;
    stream
        .set_write_timeout(Some(Duration::from_secs(2)))
        .map_err(|e| e.to_string())?;

    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let mut header_end: Option<usize> = None;
    loop {
        if let Some(end) = header_end {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            if buf.len() >= end + content_length(&head) {
                break;
            }
        }
        let n = stream.read(&mut tmp).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        if header_end.is_none() {
            header_end = buf
                .windows(4)
                .position(|w| w == b"\r\n\r\n")
                .map(|pos| pos + 4);
        }
        if buf.len() > 65536 {
            break;
        }
    }

    // Recorded before responding so the client never observes a missing request.
    requests
        .lock()
        .map_err(|e| e.to_string())?
        .push(String::from_utf8_lossy(&buf).to_string());

    if status == DROP_CONNECTION {
        return stream
            .shutdown(std::net::Shutdown::Both)
            .map_err(|e| e.to_string());
    }

    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    stream
        .write_all(header.as_bytes())
        .map_err(|e| e.to_string())?;
    stream
        .write_all(body.as_bytes())
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn chart_payload() -> String {
    r#"{
  "chart": {
    "result": [{
      "meta": {"symbol": "VOO", "regularMarketPrice": 561.2},
      "timestamp": [1760362200, 1760448600],
      "indicators": {"quote": [{"high": [565.5, 570.25], "close": [563.0, 566.1]}]}
    }],
    "error": null
  }
}"#
    .to_string()
}

fn yahoo_client(base_url: &str, retries: u32) -> YahooChartClient {
    YahooChartClient::new(base_url.to_string(), 5, retries, "dipwatch-test").expect("client")
}

#[test]
fn yahoo_client_fetches_full_daily_history() {
    let server = MockHttpServer::start(vec![(200, chart_payload())]);
    let history = yahoo_client(&server.base_url, 1)
        .fetch_history("VOO")
        .expect("history");

    assert_eq!(history.live_price, Some(561.2));
    assert_eq!(history.bars.len(), 2);
    assert_eq!(history.bars[1].high, Some(570.25));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request_line = requests[0].lines().next().unwrap_or_default().to_string();
    assert!(request_line.starts_with("GET /v8/finance/chart/VOO?"));
    assert!(request_line.contains("range=max"));
    assert!(request_line.contains("interval=1d"));
    assert!(requests[0].to_lowercase().contains("user-agent: dipwatch-test"));
}

#[test]
fn yahoo_client_reports_unknown_symbol_without_retrying() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let server = MockHttpServer::start(vec![(404, body.to_string())]);
    let err = yahoo_client(&server.base_url, 1)
        .fetch_history("NOPE")
        .expect_err("unknown symbol");

    assert!(err.contains("No data found"));
    assert!(err.contains("status 404"));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn yahoo_client_retries_once_on_server_error() {
    let server = MockHttpServer::start(vec![
        (500, "{}".to_string()),
        (200, chart_payload()),
    ]);
    let history = yahoo_client(&server.base_url, 1)
        .fetch_history("VOO")
        .expect("history after retry");

    assert_eq!(history.bars.len(), 2);
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn yahoo_client_retries_after_dropped_connection() {
    let server = MockHttpServer::start(vec![
        (DROP_CONNECTION, String::new()),
        (200, chart_payload()),
    ]);
    let history = yahoo_client(&server.base_url, 1)
        .fetch_history("VOO")
        .expect("history after transport error");

    assert_eq!(history.live_price, Some(561.2));
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn yahoo_client_reports_refused_connection_after_retries() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = yahoo_client(&format!("http://{}", addr), 1)
        .fetch_history("VOO")
        .expect_err("nothing listening");
    assert!(
        err.starts_with("market data request failed for VOO"),
        "{err}"
    );
}

#[test]
fn yahoo_client_gives_up_after_retry_budget() {
    let server = MockHttpServer::start(vec![
        (500, "{}".to_string()),
        (500, "{}".to_string()),
    ]);
    let err = yahoo_client(&server.base_url, 1)
        .fetch_history("VOO")
        .expect_err("server errors");

    assert!(err.contains("status 500"));
    assert_eq!(server.requests().len(), 2);
}

fn mailgun(base_url: &str) -> MailgunTransport {
    MailgunTransport::new(
        base_url.to_string(),
        "mg.example.com".to_string(),
        "alerts@mg.example.com".to_string(),
        "me@example.com".to_string(),
        "key-test-123".to_string(),
        5,
    )
    .expect("transport")
}

fn message() -> EmailMessage {
    EmailMessage {
        subject: "ETF price alert: VOO".to_string(),
        body: "VOO: current $100.00".to_string(),
    }
}

#[test]
fn mailgun_posts_form_with_basic_auth() {
    let server = MockHttpServer::start(vec![(
        200,
        r#"{"id":"<20261030.1@mg.example.com>","message":"Queued. Thank you."}"#.to_string(),
    )]);
    let receipt = mailgun(&server.base_url).send(&message()).expect("sent");

    assert_eq!(receipt.id.as_deref(), Some("<20261030.1@mg.example.com>"));
    assert_eq!(receipt.message.as_deref(), Some("Queued. Thank you."));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let raw = &requests[0];
    assert!(raw.starts_with("POST /v3/mg.example.com/messages "));
    let lower = raw.to_lowercase();
    assert!(lower.contains("authorization: basic "));
    // base64("api:key-test-123")
    assert!(raw.contains("YXBpOmtleS10ZXN0LTEyMw=="));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
    assert!(raw.contains("from=alerts%40mg.example.com"));
    assert!(raw.contains("to=me%40example.com"));
    assert!(raw.contains("subject=ETF+price+alert%3A+VOO"));
    assert!(raw.contains("text=VOO%3A+current+%24100.00"));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).to_string()
    }
}

#[test]
fn mailgun_unparseable_receipt_is_accepted_and_logged() {
    let server = MockHttpServer::start(vec![(200, "Queued".to_string())]);
    let transport = mailgun(&server.base_url);
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();

    let receipt = tracing::subscriber::with_default(subscriber, || transport.send(&message()))
        .expect("2xx is a delivery");

    assert_eq!(receipt.id, None);
    assert_eq!(receipt.message, None);
    let text = logs.text();
    assert!(text.contains("unrecognized mail receipt"), "{text}");
    assert!(text.contains("Queued"), "{text}");
}

#[test]
fn mailgun_rejection_is_an_error() {
    let server = MockHttpServer::start(vec![(401, "Forbidden".to_string())]);
    let err = mailgun(&server.base_url)
        .send(&message())
        .expect_err("rejected");

    assert_eq!(err, "mail http error: status 401: Forbidden");
}

#[test]
fn mailgun_requires_api_key() {
    let err = MailgunTransport::new(
        "http://127.0.0.1:1".to_string(),
        "mg.example.com".to_string(),
        "a@example.com".to_string(),
        "b@example.com".to_string(),
        "  ".to_string(),
        5,
    )
    .err()
    .expect("empty key rejected");
    assert!(err.contains("api key"));
}
