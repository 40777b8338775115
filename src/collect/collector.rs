//! Downloads forecast and history CSV from the provider and writes the table files.

use crate::collect::error::CollectError;
use crate::collect::query::{redact, Endpoint};
use crate::collect::window::history_window;
use crate::config::Config;
use crate::dates::parse_date_key;
use crate::tables::loader::TableLoader;
use crate::types::granularity::Granularity;
use crate::utils::ensure_dir_exists;
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::{Client, Url};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tokio::task;
use tokio_util::io::StreamReader;

/// First line the provider sends instead of CSV once the account's daily
/// record quota is used up.
pub const QUOTA_EXCEEDED_PREFIX: &str =
    "You have exceeded the maximum number of daily result records for your account";

/// A CSV response split into its header line and data lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvBody {
    pub header: Option<String>,
    pub rows: Vec<String>,
}

impl CsvBody {
    /// True when the response carried neither a header nor rows.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.rows.is_empty()
    }

    fn write_to<W: Write>(&self, writer: &mut W, include_header: bool) -> std::io::Result<()> {
        if include_header {
            if let Some(header) = &self.header {
                writeln!(writer, "{header}")?;
            }
        }
        for row in &self.rows {
            writeln!(writer, "{row}")?;
        }
        Ok(())
    }
}

/// Files written and locations skipped during one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub written: Vec<PathBuf>,
    pub up_to_date: Vec<String>,
}

/// Reads a response body line by line.
///
/// # Errors
///
/// Returns [`CollectError::QuotaExceeded`] as soon as a line carries the
/// provider's quota message; nothing read so far is returned.
pub async fn read_csv_body<R>(reader: R, location: &str) -> Result<CsvBody, CollectError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut body = CsvBody::default();
    while let Some(line) = lines.next_line().await? {
        if line.starts_with(QUOTA_EXCEEDED_PREFIX) {
            warn!("Quota exceeded while collecting {}: {}", location, line);
            return Err(CollectError::QuotaExceeded {
                location: location.to_string(),
                message: line,
            });
        }
        if line.is_empty() {
            continue;
        }
        match body.header {
            None => body.header = Some(line),
            Some(_) => body.rows.push(line),
        }
    }
    Ok(body)
}

/// Writes a complete table to `path`, replacing any previous file.
/// The contents are staged in a temporary file in the same directory.
///
/// An empty body leaves the disk untouched and returns `false`.
pub async fn write_new_table(path: &Path, body: CsvBody) -> Result<bool, CollectError> {
    if body.is_empty() {
        warn!("Empty response, not writing {:?}", path);
        return Ok(false);
    }

    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        let dir = path_buf.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| CollectError::FileWrite(path_buf.clone(), e))?;
        body.write_to(&mut temp_file, true)
            .and_then(|_| temp_file.flush())
            .map_err(|e| CollectError::FileWrite(path_buf.clone(), e))?;
        temp_file
            .persist(&path_buf)
            .map_err(|e| CollectError::FileWrite(path_buf.clone(), e.error))?;
        Ok::<(), CollectError>(())
    })
    .await??;
    Ok(true)
}

/// Appends rows to a history table. The header is only written when the file
/// is created. Returns the number of rows appended.
pub async fn append_history(path: &Path, body: &CsvBody) -> Result<usize, CollectError> {
    if body.is_empty() {
        warn!("Empty response, leaving {:?} unchanged", path);
        return Ok(0);
    }

    let is_new = tokio::fs::metadata(path).await.is_err();

    let mut buffer = Vec::new();
    body.write_to(&mut buffer, is_new)
        .map_err(|e| CollectError::FileWrite(path.to_path_buf(), e))?;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| CollectError::FileWrite(path.to_path_buf(), e))?;
    file.write_all(&buffer)
        .await
        .map_err(|e| CollectError::FileWrite(path.to_path_buf(), e))?;
    file.flush()
        .await
        .map_err(|e| CollectError::FileWrite(path.to_path_buf(), e))?;

    Ok(body.rows.len())
}

/// Collects forecasts and history for every configured location, one request
/// at a time.
pub struct Collector {
    client: Client,
    endpoint: Endpoint,
    config: Config,
}

impl Collector {
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] when the configuration has no API key.
    pub fn new(config: Config) -> Result<Self, CollectError> {
        Self::with_client(Client::new(), config)
    }

    /// Like [`Collector::new`], with a preconfigured HTTP client.
    pub fn with_client(client: Client, config: Config) -> Result<Self, CollectError> {
        Ok(Self {
            client,
            endpoint: Endpoint::from_config(&config)?,
            config,
        })
    }

    /// Downloads a forecast run per location and writes it to
    /// `Forecasts[_hourly]/<name><YYYYMMDD>.csv`, stamped with `today`.
    pub async fn collect_forecasts(
        &self,
        aggregate_hours: u32,
        today: NaiveDate,
    ) -> Result<CollectReport, CollectError> {
        let granularity = Granularity::from_aggregate_hours(aggregate_hours);
        let dir = self.config.data_dir.join(granularity.forecasts_dir_name());
        ensure_dir_exists(&dir)
            .await
            .map_err(|e| CollectError::DataDirCreation(dir.clone(), e))?;

        let stamp = today.format("%Y%m%d").to_string();
        let mut report = CollectReport::default();
        for location in &self.config.locations {
            let url = self.endpoint.forecast_url(location, aggregate_hours)?;
            let body = self.download(url, &location.name).await?;
            let path = dir.join(format!("{}{}.csv", location.name, stamp));
            let rows = body.rows.len();
            if write_new_table(&path, body).await? {
                info!("Wrote {} forecast rows for {} to {:?}", rows, location.name, path);
                report.written.push(path);
            }
        }
        Ok(report)
    }

    /// Extends each location's history table with the next window of
    /// observations. Locations whose history already reaches `today` are skipped.
    pub async fn collect_history(
        &self,
        aggregate_hours: u32,
        today: NaiveDate,
    ) -> Result<CollectReport, CollectError> {
        let granularity = Granularity::from_aggregate_hours(aggregate_hours);
        let loader = TableLoader::new(&self.config.data_dir, granularity);
        ensure_dir_exists(loader.history_dir())
            .await
            .map_err(|e| CollectError::DataDirCreation(loader.history_dir().to_path_buf(), e))?;

        let mut report = CollectReport::default();
        for location in &self.config.locations {
            let path = loader.history_path(&location.name);
            let last_recorded = if path.is_file() {
                last_recorded_date(&loader, &location.name, granularity)?
            } else {
                None
            };

            let Some(window) = history_window(
                last_recorded,
                self.config.history_start,
                today,
                aggregate_hours,
            ) else {
                info!("History for {} is up to date", location.name);
                report.up_to_date.push(location.name.clone());
                continue;
            };

            let url = self.endpoint.history_url(location, aggregate_hours, &window)?;
            let body = self.download(url, &location.name).await?;
            if body.is_empty() {
                warn!("Empty history response for {}", location.name);
                continue;
            }
            let rows = append_history(&path, &body).await?;
            info!(
                "Appended {} history rows for {} ({} to {}) to {:?}",
                rows,
                location.name,
                window.start_param(),
                window.end_param(),
                path
            );
            report.written.push(path);
        }
        Ok(report)
    }

    async fn download(&self, url: Url, location: &str) -> Result<CsvBody, CollectError> {
        let shown = redact(&url);
        info!("Downloading data from {}", shown);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CollectError::NetworkRequest(shown.clone(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", shown, e.status());
                return Err(match e.status() {
                    Some(status) => CollectError::HttpStatus {
                        url: shown,
                        status,
                        source: e.without_url(),
                    },
                    None => CollectError::NetworkRequest(shown, e.without_url()),
                });
            }
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = StreamReader::new(Box::pin(stream));
        read_csv_body(reader, location).await
    }
}

fn last_recorded_date(
    loader: &TableLoader,
    location: &str,
    granularity: Granularity,
) -> Result<Option<NaiveDate>, CollectError> {
    let history = loader.read_history(location)?;
    // Keys were validated when the table was read.
    Ok(history
        .last_date_key()
        .and_then(|key| parse_date_key(key, granularity).ok())
        .map(|datetime| datetime.date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST_CSV: &str = "Address,Date time,Maximum Temperature,Minimum Temperature\n\
        Orinda,01/02/2022,55,40\n\
        Orinda,01/03/2022,57,41\n";

    #[tokio::test]
    async fn test_read_csv_body_splits_header() {
        let body = read_csv_body(FORECAST_CSV.as_bytes(), "Orinda").await.unwrap();
        assert_eq!(
            body.header.as_deref(),
            Some("Address,Date time,Maximum Temperature,Minimum Temperature")
        );
        assert_eq!(body.rows, ["Orinda,01/02/2022,55,40", "Orinda,01/03/2022,57,41"]);
    }

    #[tokio::test]
    async fn test_read_csv_body_handles_crlf() {
        let body = read_csv_body("A,B\r\n1,2\r\n".as_bytes(), "Orinda").await.unwrap();
        assert_eq!(body.header.as_deref(), Some("A,B"));
        assert_eq!(body.rows, ["1,2"]);
    }

    #[tokio::test]
    async fn test_quota_message_halts() {
        let response = format!("{QUOTA_EXCEEDED_PREFIX}. Please upgrade.\n");
        let err = read_csv_body(response.as_bytes(), "Bishop").await.unwrap_err();
        match err {
            CollectError::QuotaExceeded { location, message } => {
                assert_eq!(location, "Bishop");
                assert!(message.starts_with(QUOTA_EXCEEDED_PREFIX));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_quota_after_rows_discards_everything() {
        let response = format!("A,B\n1,2\n{QUOTA_EXCEEDED_PREFIX}\n");
        assert!(read_csv_body(response.as_bytes(), "Bishop").await.is_err());
    }

    #[tokio::test]
    async fn test_write_new_table_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Orinda20220102.csv");
        std::fs::write(&path, "stale").unwrap();

        let body = read_csv_body(FORECAST_CSV.as_bytes(), "Orinda").await.unwrap();
        write_new_table(&path, body).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), FORECAST_CSV);
        // Only the table itself remains in the directory.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_append_history_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Orinda.csv");

        let first = read_csv_body("Date time,Precipitation\n01/01/2022,0\n".as_bytes(), "Orinda")
            .await
            .unwrap();
        let second = read_csv_body("Date time,Precipitation\n01/02/2022,0.3\n".as_bytes(), "Orinda")
            .await
            .unwrap();

        assert_eq!(append_history(&path, &first).await.unwrap(), 1);
        assert_eq!(append_history(&path, &second).await.unwrap(), 1);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Date time,Precipitation\n01/01/2022,0\n01/02/2022,0.3\n"
        );
    }

    #[test]
    fn test_last_recorded_date_from_history() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TableLoader::new(dir.path(), Granularity::Hourly);
        std::fs::create_dir_all(loader.history_dir()).unwrap();
        std::fs::write(
            loader.history_path("Bishop"),
            "Date time,Temperature\n03/13/2021 22:00:00,40\n03/13/2021 23:00:00,39\n",
        )
        .unwrap();

        let last = last_recorded_date(&loader, "Bishop", Granularity::Hourly).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2021, 3, 13));
    }

    #[test]
    fn test_collector_requires_api_key() {
        assert!(matches!(
            Collector::new(Config::default()),
            Err(CollectError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_leaves_history_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TableLoader::new(dir.path(), Granularity::Daily);
        std::fs::create_dir_all(loader.history_dir()).unwrap();
        let path = loader.history_path("Orinda");

        let body = read_csv_body("".as_bytes(), "Orinda").await.unwrap();
        assert!(body.is_empty());
        assert_eq!(append_history(&path, &body).await.unwrap(), 0);
        assert!(!path.exists());

        // An existing table is left as it was.
        std::fs::write(&path, "Date time,Precipitation\n01/01/2022,0\n").unwrap();
        assert_eq!(append_history(&path, &body).await.unwrap(), 0);
        let last = last_recorded_date(&loader, "Orinda", Granularity::Daily).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2022, 1, 1));
    }

    #[tokio::test]
    async fn test_empty_body_writes_no_forecast_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Orinda20220101.csv");

        assert!(!write_new_table(&path, CsvBody::default()).await.unwrap());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Serves one canned CSV body per connection until no client connects
    /// for a while. Resolves to the number of requests answered.
    async fn serve_bodies(
        bodies: Vec<String>,
    ) -> (String, tokio::task::JoinHandle<usize>) {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut served = 0;
            for body in bodies {
                let accepted =
                    tokio::time::timeout(std::time::Duration::from_millis(500), listener.accept())
                        .await;
                let Ok(Ok((mut socket, _))) = accepted else {
                    break;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
                served += 1;
            }
            served
        });
        (base_url, handle)
    }

    fn local_collector(base_url: String, data_dir: &Path, locations: &[&str]) -> Collector {
        let config = Config {
            api_key: Some("test-key".to_string()),
            base_url,
            data_dir: data_dir.to_path_buf(),
            history_start: NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
            locations: locations
                .iter()
                .map(|name| crate::config::Location::new(*name, *name))
                .collect(),
            ..Config::default()
        };
        let client = Client::builder().no_proxy().build().unwrap();
        Collector::with_client(client, config).unwrap()
    }

    #[tokio::test]
    async fn test_collect_history_skips_up_to_date_location() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2022, 1, 5).unwrap();
        let loader = TableLoader::new(dir.path(), Granularity::Daily);
        std::fs::create_dir_all(loader.history_dir()).unwrap();
        let bishop = "Date time,Precipitation\n01/04/2022,0\n01/05/2022,0.2\n";
        std::fs::write(loader.history_path("Bishop"), bishop).unwrap();

        let orinda = "Date time,Precipitation\n01/04/2022,0\n01/05/2022,0.1\n";
        let (base_url, server) = serve_bodies(vec![orinda.to_string()]).await;
        let collector = local_collector(base_url, dir.path(), &["Bishop", "Orinda"]);

        let report = collector.collect_history(24, today).await.unwrap();
        assert_eq!(report.up_to_date, ["Bishop"]);
        assert_eq!(report.written, [loader.history_path("Orinda")]);
        assert_eq!(server.await.unwrap(), 1);

        assert_eq!(std::fs::read_to_string(loader.history_path("Bishop")).unwrap(), bishop);
        assert_eq!(std::fs::read_to_string(loader.history_path("Orinda")).unwrap(), orinda);
    }

    #[tokio::test]
    async fn test_quota_stops_forecast_collection() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2022, 1, 5).unwrap();
        let quota = format!("{QUOTA_EXCEEDED_PREFIX}.\n");
        let (base_url, server) = serve_bodies(vec![quota, FORECAST_CSV.to_string()]).await;
        let collector = local_collector(base_url, dir.path(), &["Orinda", "Bishop"]);

        let err = collector.collect_forecasts(24, today).await.unwrap_err();
        assert!(matches!(err, CollectError::QuotaExceeded { ref location, .. } if location == "Orinda"));
        // Bishop is never requested and nothing is written.
        assert_eq!(server.await.unwrap(), 1);
        let forecasts_dir = dir.path().join("Forecasts");
        assert_eq!(std::fs::read_dir(forecasts_dir).unwrap().count(), 0);
    }
}
