//! Implementation of `scaffold matrix`: the manifest as a one-line JSON CI
//! matrix for external automation.

use scaffold_core::{application::ManifestStore, domain::CiMatrix};

use crate::{
    context::AppContext,
    error::{CliError, CliResult},
};

pub fn execute(ctx: &AppContext) -> CliResult<()> {
    let fs = ctx.filesystem();
    let manifest = ManifestStore::new(fs.as_ref(), ctx.workspace.manifest_path()).load()?;

    let line = serde_json::to_string(&CiMatrix::from_manifest(&manifest)).map_err(|e| {
        CliError::IoError {
            message: "Failed to serialise matrix".into(),
            source: std::io::Error::other(e),
        }
    })?;
    println!("{line}");
    Ok(())
}
