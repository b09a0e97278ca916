use std::fs;
use std::path::{Path, PathBuf};

use gistdeck::NewGist;
use gistdeck::search::extract_gist_id;
use gistdeck::validate::validate_new_gist;

use crate::PageArgs;
use crate::commands::shared::Context;
use crate::output::{self, OutputFormat};

pub(crate) async fn handle_public(
    ctx: &Context,
    page: PageArgs,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let per_page = page.per_page_or(ctx.per_page);
    let result = ctx
        .read("list_public_gists", || {
            ctx.client.list_public_gists(page.page, per_page)
        })
        .await?;
    output::print_page(&result.gists, &result.cursor, output)
}

pub(crate) async fn handle_user(
    ctx: &Context,
    username: &str,
    page: PageArgs,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let per_page = page.per_page_or(ctx.per_page);
    let result = ctx
        .read("list_user_gists", || {
            ctx.client.list_user_gists(username, page.page, per_page)
        })
        .await?;
    output::print_page(&result.gists, &result.cursor, output)
}

pub(crate) async fn handle_mine(
    ctx: &Context,
    page: PageArgs,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let per_page = page.per_page_or(ctx.per_page);
    let result = ctx
        .read("list_authenticated_user_gists", || {
            ctx.client
                .list_authenticated_user_gists(page.page, per_page)
        })
        .await?;
    output::print_page(&result.gists, &result.cursor, output)
}

pub(crate) async fn handle_show(
    ctx: &Context,
    id_or_url: &str,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let gist = ctx.resolve_gist(id_or_url).await?;
    output::print_gist_detail(&gist, output)
}

pub(crate) async fn handle_create(
    ctx: &Context,
    files: &[PathBuf],
    description: Option<String>,
    public: bool,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = new_gist_from_files(files, description.unwrap_or_default(), public)?;

    let problems = validate_new_gist(&body);
    if !problems.is_empty() {
        return Err(problems.join("\n").into());
    }

    let created = ctx.client.create_gist(&body).await?;
    match output {
        OutputFormat::Json => output::print_gist_detail(&created, output)?,
        OutputFormat::Table => {
            output::success(&format!("Created gist {}", created.id));
            println!("{}", created.html_url);
        }
    }
    Ok(())
}

pub(crate) async fn handle_delete(
    ctx: &Context,
    id_or_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = extract_gist_id(id_or_url);
    ctx.client.delete_gist(&id).await?;
    output::success(&format!("Deleted gist {}", id));
    Ok(())
}

/// Read each path into a file entry keyed by its base name.
fn new_gist_from_files(
    files: &[PathBuf],
    description: String,
    public: bool,
) -> Result<NewGist, Box<dyn std::error::Error>> {
    let mut gist = NewGist::new(description, public);
    for path in files {
        let name = file_name(path)?;
        if gist.files.contains_key(&name) {
            return Err(format!("Duplicate file name: {}", name).into());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        gist = gist.with_file(name, content);
    }
    Ok(gist)
}

fn file_name(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Not a file path: {}", path.display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gist_from_files_uses_base_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let a = dir.path().join("main.rs");
        let b = dir.path().join("README.md");
        fs::write(&a, "fn main() {}").unwrap();
        fs::write(&b, "# hi").unwrap();

        let gist = new_gist_from_files(&[a, b], "demo".into(), true).expect("body");
        assert_eq!(gist.description, "demo");
        assert!(gist.public);
        assert_eq!(gist.files["main.rs"].content, "fn main() {}");
        assert_eq!(gist.files["README.md"].content, "# hi");
    }

    #[test]
    fn test_new_gist_from_files_rejects_duplicates_and_missing_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let a = dir.path().join("x.txt");
        fs::write(&a, "x").unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        let b = nested.join("x.txt");
        fs::write(&b, "y").unwrap();

        let err = new_gist_from_files(&[a, b], String::new(), false).expect_err("duplicate");
        assert!(err.to_string().contains("Duplicate file name"));

        let err = new_gist_from_files(&[dir.path().join("missing.txt")], String::new(), false)
            .expect_err("missing");
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_blank_file_fails_validation() {
        let dir = tempfile::tempdir().expect("temp dir");
        let a = dir.path().join("empty.txt");
        fs::write(&a, "  \n").unwrap();

        let gist = new_gist_from_files(&[a], String::new(), false).expect("body");
        assert_eq!(
            validate_new_gist(&gist),
            vec!["File \"empty.txt\" cannot be empty".to_string()]
        );
    }
}
