use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn reserve_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve addr");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

fn wait_for_http(addr: &str) {
    for _ in 0..200 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("http server not ready on {addr}");
}

fn send_http(addr: &str, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect http");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).expect("write request");
    stream.flush().expect("flush");
    let mut buf = String::new();
    stream.read_to_string(&mut buf).expect("read response");
    buf
}

fn response_body(response: &str) -> &str {
    response.split("\r\n\r\n").nth(1).unwrap_or("")
}

fn response_json(response: &str) -> serde_json::Value {
    serde_json::from_str(response_body(response)).expect("json body")
}

fn temp_path(label: &str) -> std::path::PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "credit-risk-http-{label}-{}-{now}.csv",
        std::process::id()
    ))
}

fn spawn_daemon(addr: &str, data_path: &std::path::Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_credit-riskd"))
        .env("CREDIT_RISK_HTTP_ADDR", addr)
        .env("CREDIT_RISK_DATA", data_path)
        .env("CREDIT_RISK_LOG", "warn")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn credit-riskd")
}

#[test]
fn http_endpoints_follow_contract() {
    let data_path = temp_path("contract");
    std::fs::write(
        &data_path,
        "member_id,loan_amnt,annual_inc,fico_range_high,loan_status\n\
         1001,15000.0,72000.0,705,Fully Paid\n\
         1002,8000.0,,610,Charged Off\n\
         1003,30000.0,150000.0,800,Current\n",
    )
    .expect("write data");
    let addr = reserve_addr();
    let mut child = spawn_daemon(&addr, &data_path);
    wait_for_http(&addr);

    let health = send_http(&addr, "GET", "/health", "");
    assert!(health.starts_with("HTTP/1.1 200"));
    let health_json = response_json(&health);
    assert_eq!(health_json["status"], "healthy");
    assert_eq!(health_json["service"], "Credit Risk API");
    assert_eq!(health_json["records_loaded"], 3);

    let found = send_http(&addr, "POST", "/get_data", r#"{"member_id":1002}"#);
    assert!(found.starts_with("HTTP/1.1 200"));
    let record = response_json(&found);
    assert_eq!(record["member_id"], 1002);
    assert!(record["annual_inc"].is_null());
    assert_eq!(record["loan_status"], "Charged Off");

    let missing = send_http(&addr, "POST", "/get_data", r#"{"member_id":999999}"#);
    assert!(missing.starts_with("HTTP/1.1 404"));
    assert_eq!(response_json(&missing)["error"], "User not found");

    let no_body = send_http(&addr, "POST", "/get_data", "");
    assert!(no_body.starts_with("HTTP/1.1 400"));
    assert_eq!(
        response_json(&no_body)["error"],
        "Request must include JSON body"
    );

    let score = send_http(
        &addr,
        "POST",
        "/risk_score",
        r#"{"fico_range_high":680,"annual_inc":55000}"#,
    );
    assert!(score.starts_with("HTTP/1.1 200"));
    let score_json = response_json(&score);
    assert_eq!(score_json["risk_score"], 20.0);
    assert_eq!(score_json["risk_category"], "Low");

    let bad_score = send_http(
        &addr,
        "POST",
        "/risk_score",
        r#"{"fico_range_high":"high","annual_inc":55000}"#,
    );
    assert!(bad_score.starts_with("HTTP/1.1 400"));

    let loss = send_http(
        &addr,
        "POST",
        "/calc_ecl",
        r#"{"loan_amnt":10000,"risk_score":50}"#,
    );
    assert!(loss.starts_with("HTTP/1.1 200"));
    let loss_json = response_json(&loss);
    assert_eq!(loss_json["expected_credit_loss"], 5000.0);
    assert_eq!(loss_json["currency"], "USD");

    let negative = send_http(
        &addr,
        "POST",
        "/calc_ecl",
        r#"{"loan_amnt":-5,"risk_score":10}"#,
    );
    assert!(negative.starts_with("HTTP/1.1 400"));
    assert_eq!(response_json(&negative)["error"], "loan_amnt must be positive");

    let unknown = send_http(&addr, "GET", "/nope", "");
    assert!(unknown.starts_with("HTTP/1.1 404"));

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_file(data_path);
}

#[test]
fn http_health_is_stable_under_concurrent_load() {
    let data_path = temp_path("missing");
    let addr = reserve_addr();
    let mut child = spawn_daemon(&addr, &data_path);
    wait_for_http(&addr);

    let workers = (0..8)
        .map(|_| {
            let addr = addr.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    let health = send_http(&addr, "GET", "/health", "");
                    assert!(health.starts_with("HTTP/1.1 200"));
                    assert_eq!(response_json(&health)["records_loaded"], 3);
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().expect("health worker");
    }

    let placeholder = send_http(&addr, "POST", "/get_data", r#"{"member_id":"101"}"#);
    assert!(placeholder.starts_with("HTTP/1.1 200"));
    let placeholder = response_json(&placeholder);
    assert_eq!(placeholder["fico_range_high"], 680);
    assert_eq!(placeholder["loan_amnt"], 10000);
    assert_eq!(placeholder["annual_inc"], 55000);

    let _ = child.kill();
    let _ = child.wait();
}

#[test]
fn unknown_log_format_warning_reaches_the_log() {
    let data_path = temp_path("log-format");
    let addr = reserve_addr();
    let mut child = Command::new(env!("CARGO_BIN_EXE_credit-riskd"))
        .env("CREDIT_RISK_HTTP_ADDR", &addr)
        .env("CREDIT_RISK_DATA", &data_path)
        .env("CREDIT_RISK_LOG", "warn")
        .env("CREDIT_RISK_LOG_FORMAT", "yaml")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn credit-riskd");
    wait_for_http(&addr);

    let _ = child.kill();
    let output = child.wait_with_output().expect("daemon output");
    let logged = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        logged.contains("falling back to compact log format"),
        "log output: {logged}"
    );
    assert!(logged.contains("yaml"), "log output: {logged}");
}
