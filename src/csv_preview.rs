/// Bounded tabular preview of a CSV byte buffer
///
/// The frontend renders only the first few rows of a classified file but
/// still reports how many rows the file holds in total.
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl CsvPreview {
    /// Parse the header row plus the first `limit` data rows
    ///
    /// `total_rows` counts every data row in the buffer, not just the
    /// previewed ones. Ragged or non-UTF-8 bodies are a parse error.
    pub fn from_bytes(bytes: &[u8], limit: usize) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(bytes);

        let headers = reader
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut total_rows = 0;

        for record in reader.records() {
            let record = record.context("Failed to read CSV record")?;
            if total_rows < limit {
                rows.push(record.iter().map(|f| f.to_string()).collect());
            }
            total_rows += 1;
        }

        Ok(Self {
            headers,
            rows,
            total_rows,
        })
    }

    /// True when the preview shows fewer rows than the file holds
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_and_rows_are_extracted() {
        let body = "source,log_message,target_label\n\
                    ModernCRM,Case escalation failed,Workflow Error\n\
                    LegacyCRM,Module retired soon,Deprecation Warning\n";

        let preview = CsvPreview::from_bytes(body.as_bytes(), 5).unwrap();
        assert_eq!(preview.headers, vec!["source", "log_message", "target_label"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 2);
        assert!(!preview.is_truncated());
        assert_eq!(preview.rows[0][2], "Workflow Error");
    }

    #[test]
    fn test_preview_is_limited_but_total_counts_everything() {
        let mut body = String::from("source,log_message\n");
        for i in 0..7 {
            body.push_str(&format!("svc{},message {}\n", i, i));
        }

        let preview = CsvPreview::from_bytes(body.as_bytes(), 5).unwrap();
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.total_rows, 7);
        assert!(preview.is_truncated());
        assert_eq!(preview.rows[4][0], "svc4");
    }

    #[test]
    fn test_non_csv_body_is_an_error() {
        let body = "<html><body>502 Bad Gateway, sorry</body></html>\n\
                    this line has, extra fields, all over, the place\n\
                    and this one none\n";

        assert!(CsvPreview::from_bytes(body.as_bytes(), 5).is_err());
    }

    #[test]
    fn test_empty_body_has_no_rows() {
        let preview = CsvPreview::from_bytes(b"", 5).unwrap();
        assert!(preview.headers.is_empty());
        assert_eq!(preview.total_rows, 0);
    }
}
