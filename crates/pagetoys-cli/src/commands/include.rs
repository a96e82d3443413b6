use std::path::PathBuf;

use clap::Subcommand;
use pagetoys_core::include;
use pagetoys_core::Config;

#[derive(Subcommand)]
pub enum IncludeAction {
    /// Fill a page's header/footer placeholders and print the result
    Render {
        /// Page to compose (e.g. site/fried-chips.html)
        page: PathBuf,
        /// Directory holding header.html/footer.html; defaults to the page's directory
        #[arg(long)]
        site_dir: Option<PathBuf>,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: IncludeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        IncludeAction::Render {
            page,
            site_dir,
            output,
        } => {
            let config = Config::load_or_default().include;
            let html = std::fs::read_to_string(&page)?;
            let current = page
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let site_dir = site_dir
                .or_else(|| page.parent().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));

            let composed = include::compose(&html, &current, &site_dir, &config);
            match output {
                Some(path) => std::fs::write(path, composed)?,
                None => println!("{composed}"),
            }
        }
    }
    Ok(())
}
