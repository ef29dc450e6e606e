use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(workbook: Option<String>, rules: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(path) = workbook {
        settings.workbook = shellexpand_path(&path);
    }
    if let Some(path) = rules {
        settings.rules_file = shellexpand_path(&path);
    }
    save_settings(&settings)?;

    println!("Saved settings:");
    println!(
        "  workbook:   {}",
        if settings.workbook.is_empty() { "(not set)" } else { &settings.workbook }
    );
    println!(
        "  rules file: {}",
        if settings.rules_file.is_empty() { "(not set)" } else { &settings.rules_file }
    );
    Ok(())
}
