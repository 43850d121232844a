use std::path::PathBuf;

use model_ngin::ViewerConfig;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ViewerConfig::load(&path)?,
        None => ViewerConfig::default(),
    };
    model_ngin::run(config)
}
