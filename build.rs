//! Build script that installs configuration templates into the user's local
//! data directory, so `.env.example` and `rules.example.json` end up next to
//! where the application looks for the real files.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run if a template changes
    println!("cargo:rerun-if-changed=.env.example");
    println!("cargo:rerun-if-changed=rules.example.json");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("curacli");
    fs::create_dir_all(&out_dir)?;

    for template in [".env.example", "rules.example.json"] {
        let source = manifest_dir.join(template);
        if source.is_file() {
            let contents = fs::read_to_string(&source)?;
            fs::write(out_dir.join(template), contents)?;
        } else {
            println!(
                "cargo:warning={} not found at {}",
                template,
                source.display()
            );
        }
    }

    Ok(())
}
