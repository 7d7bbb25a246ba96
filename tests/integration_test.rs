use book_of_abstracts::error::{AppError, FetchError};
use book_of_abstracts::{App, Config, HttpFetcher, MemorySheet, PdfFetcher, PdfSource, SheetSource, XlsxSheet};
use std::path::Path;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 记录调用次数的下载器，URL 中含 `broken` 时返回 HTML
#[derive(Default)]
struct CountingFetcher {
    calls: Mutex<Vec<String>>,
}

impl CountingFetcher {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PdfFetcher for CountingFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let body: &[u8] = if url.contains("broken") {
            b"<html>Access denied</html>"
        } else {
            b"%PDF-1.7\n%fake\n"
        };
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(dest, body).unwrap();
        Ok(())
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        out_tex: dir.join("out/BookAbstract.tex"),
        output_log_file: dir.join("skipped.txt").display().to_string(),
        ..Config::default()
    }
}

fn sample_sheet() -> MemorySheet {
    MemorySheet::new()
        // 表头
        .set(2, 2, "Title")
        .set(2, 9, "Area")
        // 第二个分区里的记录排在表格前面
        .set(3, 2, "Beam buckling")
        .set(3, 3, "https://conf.org/files/beam.pdf")
        .set(3, 9, "Structures")
        .set(3, 10, "B. Beta*")
        .set(4, 2, "Keynote & Vision")
        .set(4, 3, "Download")
        .link(4, 3, "https://conf.org/files/keynote.pdf")
        .set(4, 9, "Plenary")
        .set(4, 10, "A. Alpha, C. Gamma*")
        .set(5, 2, "Paywalled")
        .set(5, 3, "https://conf.org/files/broken.pdf")
        .set(5, 9, "Plenary")
        .set(5, 10, "D. Delta")
        .set(6, 2, "Wrong area")
        .set(6, 3, "https://conf.org/files/other.pdf")
        .set(6, 9, "Poster")
}

#[tokio::test]
async fn test_build_orders_by_area_and_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let app = App::with_fetcher(config, CountingFetcher::default());

    let summary = app.build_from_sheet(&sample_sheet()).await.unwrap();

    assert_eq!(summary.stats.candidates, 3);
    assert_eq!(summary.stats.downloaded, 2);
    assert_eq!(summary.stats.skipped, 1);

    let titles: Vec<&str> = summary.records.iter().map(|r| r.record.title.as_str()).collect();
    assert_eq!(titles, vec!["Keynote & Vision", "Beam buckling"]);
    assert_eq!(summary.records[0].id, "abs:0001");
    assert_eq!(summary.records[1].label, "lab:0002");

    // 缓存文件名使用候选序号
    let pdf_dir = dir.path().join("out/downloaded_pdfs");
    assert_eq!(summary.records[0].pdf_path, pdf_dir.join("keynote_0001.pdf"));
    assert_eq!(summary.records[1].pdf_path, pdf_dir.join("beam_0003.pdf"));
    assert!(!pdf_dir.join("broken_0002.pdf").exists());

    let tex = std::fs::read_to_string(dir.path().join("out/BookAbstract.tex")).unwrap();
    assert!(tex.contains(r"C. Gamma & \hyperlink{abs:0001}{Keynote \& Vision} & \pageref{lab:0001} \\"));
    assert!(tex.contains(r"B. Beta & \hyperlink{abs:0002}{Beam buckling} & \pageref{lab:0002} \\"));
    let keynote = tex.find("{downloaded_pdfs/keynote_0001.pdf}").unwrap();
    let beam = tex.find("{downloaded_pdfs/beam_0003.pdf}").unwrap();
    assert!(keynote < beam);
    assert!(!tex.contains("Poster"));
    assert!(!tex.contains("Paywalled"));

    let report = std::fs::read_to_string(dir.path().join("skipped.txt")).unwrap();
    assert!(report.contains("行 5 | 分区 Plenary | 标题: Paywalled"));
}

#[tokio::test]
async fn test_url_local_and_missing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let local_dir = dir.path().join("local_pdfs");
    std::fs::create_dir_all(&local_dir).unwrap();
    std::fs::write(local_dir.join("Composite fatigue.pdf"), b"%PDF-1.5\nlocal\n").unwrap();

    let config = Config {
        fallback_dir: Some(local_dir),
        ..test_config(dir.path())
    };
    let app = App::with_fetcher(config, CountingFetcher::default());
    let sheet = MemorySheet::new()
        .set(3, 2, "Composite fatigue")
        .set(3, 9, "Damage Mechanics")
        .set(3, 10, "G. Local*")
        .set(4, 2, "Remote keynote")
        .set(4, 3, "https://conf.org/files/remote.pdf")
        .set(4, 9, "Plenary")
        .set(4, 10, "H. Remote")
        .set(5, 2, "Nowhere to be found")
        .set(5, 9, "Damage Mechanics")
        .set(5, 10, "I. Missing");

    let summary = app.build_from_sheet(&sheet).await.unwrap();

    let got: Vec<(&str, PdfSource, &str)> = summary
        .records
        .iter()
        .map(|r| (r.record.title.as_str(), r.source, r.id.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("Remote keynote", PdfSource::Url, "abs:0001"),
            ("Composite fatigue", PdfSource::Local, "abs:0002"),
        ]
    );
    assert_eq!(summary.stats.skipped, 1);
    assert_eq!(app.fetcher().calls().len(), 1);

    let report = std::fs::read_to_string(dir.path().join("skipped.txt")).unwrap();
    assert!(report.contains("行 5 | 分区 Damage Mechanics | 标题: Nowhere to be found"));
}

#[tokio::test]
async fn test_rerun_uses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::with_fetcher(test_config(dir.path()), CountingFetcher::default());

    app.build_from_sheet(&sample_sheet()).await.unwrap();
    let first_calls = app_calls(&app);
    assert_eq!(first_calls, 3);

    let summary = app.build_from_sheet(&sample_sheet()).await.unwrap();
    assert_eq!(summary.stats.from_cache, 2);
    assert_eq!(summary.stats.downloaded, 0);
    assert!(summary.records.iter().all(|r| r.source == PdfSource::Cache));
    // 只有失败的那条会再次请求
    assert_eq!(app_calls(&app), first_calls + 1);
}

fn app_calls(app: &App<CountingFetcher>) -> usize {
    app.fetcher().calls().len()
}

#[tokio::test]
async fn test_empty_sheet_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::with_fetcher(test_config(dir.path()), CountingFetcher::default());

    let err = app.build_from_sheet(&MemorySheet::new()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::NoRecords { candidates: 0 })
    ));
    assert!(!dir.path().join("out/BookAbstract.tex").exists());
}

#[tokio::test]
async fn test_run_reads_xlsx_with_hyperlinks() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("Abstract_list.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Abstracts").unwrap();
    // rust_xlsxwriter 行列从0开始
    sheet.write_string(1, 1, "Title").unwrap();
    sheet.write_string(2, 1, "Thin ply laminates").unwrap();
    sheet
        .write_url_with_text(2, 2, "https://conf.org/files/thin.pdf", "PDF")
        .unwrap();
    sheet.write_string(2, 8, "Thin Ply").unwrap();
    sheet.write_string(2, 9, "E. Epsilon*, F. Phi").unwrap();
    sheet.write_number(3, 1, 42.0).unwrap();
    sheet.write_string(3, 8, "Plenary").unwrap();
    workbook.save(&xlsx).unwrap();

    let opened = XlsxSheet::open(&xlsx, None).unwrap();
    assert_eq!(opened.name(), "Abstracts");
    assert_eq!(opened.max_row(), 4);
    assert_eq!(opened.cell_text(3, 2), "Thin ply laminates");
    assert_eq!(opened.cell_text(3, 3), "PDF");
    assert_eq!(
        opened.cell_hyperlink(3, 3).as_deref(),
        Some("https://conf.org/files/thin.pdf")
    );
    assert_eq!(opened.cell_text(4, 2), "42");

    let config = Config {
        xlsx_path: xlsx.clone(),
        ..test_config(dir.path())
    };
    let app = App::with_fetcher(config, CountingFetcher::default());
    let summary = app.run().await.unwrap();

    // 第4行没有 URL，也没有备用目录
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].record.main_author, "E. Epsilon");
    assert_eq!(summary.stats.skipped, 1);
    assert_eq!(app.fetcher().calls(), vec!["https://conf.org/files/thin.pdf".to_string()]);
}

/// 本地 HTTP 服务：`/ok.pdf` 返回 PDF，其余返回 404；收到的 User-Agent 写入 `seen`
async fn spawn_server() -> (String, std::sync::Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
    let seen_in_server = seen.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let seen = seen_in_server.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf).to_string();
                for line in request.lines() {
                    if let Some(ua) = line.strip_prefix("user-agent: ").or_else(|| line.strip_prefix("User-Agent: ")) {
                        seen.lock().unwrap().push(ua.to_string());
                    }
                }

                let response: Vec<u8> = if request.starts_with("GET /ok.pdf ") {
                    let body = b"%PDF-1.4\nstreamed body\n";
                    let mut r = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    )
                    .into_bytes();
                    r.extend_from_slice(body);
                    r
                } else {
                    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec()
                };
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn test_http_fetcher_streams_to_file() {
    let (base, seen) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        chunk_size: 4,
        ..Config::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();

    let dest = dir.path().join("nested/ok.pdf");
    fetcher.fetch(&format!("{base}/ok.pdf"), &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4\nstreamed body\n");
    assert_eq!(seen.lock().unwrap().as_slice(), ["xlsx-pdf-embed/1.0".to_string()]);
}

#[tokio::test]
async fn test_http_fetcher_rejects_error_status() {
    let (base, _seen) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&Config::default()).unwrap();

    let dest = dir.path().join("missing.pdf");
    let err = fetcher
        .fetch(&format!("{base}/missing.pdf"), &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert!(!dest.exists());
}
