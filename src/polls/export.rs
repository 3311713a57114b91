//! Download renderers over `Summary`: sectioned CSV and pretty JSON.

use crate::errors::AppError;
use crate::polls::results::{Summary, Tally};

fn csv_err(e: impl std::fmt::Display) -> AppError {
    AppError::Export(format!("CSV write failed: {e}"))
}

/// Sectioned CSV: poll header block, voter section, result section.
/// Flexible writer — section headings are shorter than data rows.
pub fn summary_csv(summary: &Summary) -> Result<Vec<u8>, AppError> {
    let mut w = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

    w.write_record(["Poll ID", "Title", "Question Type", "Is Anonymous"])
        .map_err(csv_err)?;
    w.write_record([
        summary.poll_id.to_string(),
        summary.title.clone(),
        summary.question_type.as_str().to_string(),
        summary.is_anonymous.to_string(),
    ])
    .map_err(csv_err)?;

    w.write_record(["", "", "", ""]).map_err(csv_err)?;
    w.write_record(["Voters"]).map_err(csv_err)?;
    w.write_record(["User ID", "Email"]).map_err(csv_err)?;
    for voter in &summary.voters {
        let email = voter.email.as_deref().unwrap_or("Anonymous");
        w.write_record([voter.voted_by.as_str(), email]).map_err(csv_err)?;
    }

    w.write_record(["", "", "", ""]).map_err(csv_err)?;
    w.write_record(["Results"]).map_err(csv_err)?;
    match &summary.results {
        Tally::Text(rows) => {
            w.write_record(["Text Answer", "Count"]).map_err(csv_err)?;
            for (answer, count) in rows {
                w.write_record([answer.as_str(), &count.to_string()]).map_err(csv_err)?;
            }
        }
        Tally::Scale(rows) => {
            w.write_record(["Scale Value", "Count"]).map_err(csv_err)?;
            for (value, count) in rows {
                w.write_record([value.to_string(), count.to_string()]).map_err(csv_err)?;
            }
        }
        Tally::Choice(rows) => {
            w.write_record(["Option", "Count"]).map_err(csv_err)?;
            for (option, count) in rows {
                w.write_record([option.as_str(), &count.to_string()]).map_err(csv_err)?;
            }
        }
    }

    w.into_inner().map_err(csv_err)
}

pub fn summary_json(summary: &Summary) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(summary)
        .map_err(|e| AppError::Export(format!("JSON encode failed: {e}")))
}
