//! `cdirec backends`

use anyhow::{Context, Result};
use serde::Serialize;
use strum::IntoEnumIterator;

use cdirec_backend::{LibraryName, resolve_kind};

#[derive(Debug, Serialize)]
struct BackendRow {
    library: String,
    /// Engine for 1-, 2- and 3-D data; `None` where unsupported
    engines: [Option<String>; 3],
}

fn rows() -> Vec<BackendRow> {
    LibraryName::iter()
        .map(|library| BackendRow {
            library: library.to_string(),
            engines: [1, 2, 3].map(|ndim| resolve_kind(library, ndim).ok().map(|k| k.to_string())),
        })
        .collect()
}

pub fn execute_backends_command(json: bool) -> Result<()> {
    let rows = rows();
    if json {
        let output = serde_json::to_string_pretty(&rows).context("Failed to encode backends")?;
        println!("{output}");
        return Ok(());
    }

    println!("{:<8} {:<12} {:<12} {:<12}", "LIBRARY", "1-D", "2-D", "3-D");
    for row in rows {
        let [one, two, three] = row
            .engines
            .map(|engine| engine.unwrap_or_else(|| "-".to_string()));
        println!("{:<8} {one:<12} {two:<12} {three:<12}", row.library);
    }
    Ok(())
}
