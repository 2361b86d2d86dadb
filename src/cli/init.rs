use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(results_dir: Option<String>, catalog: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = results_dir {
        settings.results_dir = shellexpand_path(&dir);
    }
    if let Some(path) = catalog {
        settings.catalog_path = Some(shellexpand_path(&path));
    }

    save_settings(&settings)?;

    println!("Results directory: {}", settings.results_dir);
    println!("Catalog:           {}", settings.catalog_file().display());
    Ok(())
}
