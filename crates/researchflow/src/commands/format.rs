use super::App;
use anyhow::Context;
use researchflow_client::FormatOutcome;
use researchflow_storage::atomic_write;
use std::path::{Path, PathBuf};

pub async fn run(app: &App, file: &Path, style: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("could not read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let out_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app.paths.downloads_dir());

    match app.client.format_document(&filename, bytes, style).await? {
        FormatOutcome::Links { pdf, tex } => {
            for link in [pdf, tex] {
                let data = app.client.download(&link).await?;
                let target = out_dir.join(link_filename(&link));
                atomic_write(&target, &data)
                    .with_context(|| format!("could not write {}", target.display()))?;
                println!("Wrote {}", target.display());
            }
        }
        FormatOutcome::File { filename, bytes } => {
            let target = out_dir.join(&filename);
            atomic_write(&target, &bytes)
                .with_context(|| format!("could not write {}", target.display()))?;
            println!("Wrote {}", target.display());
        }
    }
    Ok(())
}

/// Last path segment of a download link, without query or fragment
fn link_filename(link: &str) -> PathBuf {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    match path.rsplit('/').next().filter(|s| !s.is_empty()) {
        Some(name) => PathBuf::from(name),
        None => PathBuf::from("formatted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_filename() {
        assert_eq!(
            link_filename("http://host/media/out/paper.pdf?x=1"),
            PathBuf::from("paper.pdf")
        );
        assert_eq!(link_filename("http://host/media/"), PathBuf::from("formatted"));
    }
}
