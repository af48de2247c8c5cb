use std::path::PathBuf;

use focuseye_core::tray::tray_summary;
use focuseye_core::SessionEngine;

pub fn run(tray: bool, file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::settings_store(file)?;
    let engine = SessionEngine::from_repository(&store);
    if tray {
        println!("{}", tray_summary(&engine.state()));
    } else {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    }
    Ok(())
}
