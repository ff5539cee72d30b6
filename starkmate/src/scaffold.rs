use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const CONTRACT_TEMPLATE: &str = include_str!("../templates/contract.cairo");
const DEPLOY_TEMPLATE: &str = include_str!("../templates/deploy.sh");

struct Template {
    dir: &'static str,
    file: &'static str,
    contents: &'static str,
}

const TEMPLATES: [Template; 2] = [
    Template {
        dir: "contracts",
        file: "contract.cairo",
        contents: CONTRACT_TEMPLATE,
    },
    Template {
        dir: "scripts",
        file: "deploy.sh",
        contents: DEPLOY_TEMPLATE,
    },
];

/// Creates `contracts/` and `scripts/` under `base_dir` and writes the starter
/// files into them. Existing files with the same name are overwritten.
pub fn init_project(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(TEMPLATES.len());
    for template in &TEMPLATES {
        let dir = base_dir.join(template.dir);
        fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

        let path = dir.join(template.file);
        if path.exists() {
            log::info!("overwriting {}", path.display());
        }
        fs::write(&path, template.contents)
            .with_context(|| format!("cannot write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
