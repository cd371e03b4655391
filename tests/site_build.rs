//! End-to-end builds against small source trees on disk.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use trowel::collection::CollectionError;
use trowel::generator::{GenerateError, GeneratorRegistry};
use trowel::naming::NameError;
use trowel::publish::TEMP_PREFIX;
use trowel::site::{self, BuildError, BuildOptions};

// =========================================================================
// Fixtures
// =========================================================================

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn build(root: &Path) -> Result<site::BuildReport, BuildError> {
    site::build(&BuildOptions::new(root), &GeneratorRegistry::with_builtins().unwrap())
}

fn staging_entries(root: &Path) -> usize {
    fs::read_dir(root)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with(TEMP_PREFIX)
        })
        .count()
}

/// A site with one layout, three posts and a gallery listing.
fn blog(root: &Path) {
    write(
        &root.join("_config.yml"),
        "title: Field Notes\ncollections:\n  gallery:\n    generator: listing\n    path: gallery\n    image_width: 20\n    thumb_width: 8\n",
    );
    write(
        &root.join("_layouts/post.html"),
        "<article><h1>{{page.title}}</h1>{{{content}}}</article>",
    );
    write(
        &root.join("index.html"),
        "{{title}};{{#each posts}}{{title}}|{{{prev}}}|{{{next}}};{{/each}}",
    );
    write(&root.join("css/site.css"), "body { color: {{color}}; }");
    write(&root.join("robots.txt"), "User-agent: *");
    write(
        &root.join("_posts/2024-01-05-hello.html"),
        "---\ntitle: Hello\nlayout: post\n---\n<p>{{page.date}}</p>",
    );
    write(&root.join("_posts/2023-06-01-older.html"), "---\ntitle: Older\n---\nold");
    write(&root.join("_posts/2024-03-10-newest.html"), "---\ntitle: Newest\n---\nnew");
    write(
        &root.join("_gallery/42-my-shot.html"),
        "---\ncaption: Harbour\n---\n<img src=\"{{{page.img}}}\">",
    );
    write_png(&root.join("_gallery/42-my-shot.png"), 40, 30);
}

// =========================================================================
// Rendering
// =========================================================================

#[test]
fn posts_render_newest_first_with_links() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    build(tmp.path()).unwrap();

    let index = read(&tmp.path().join("_site/index.html"));
    assert_eq!(
        index,
        "Field Notes;\
         Newest||2024/01/05/hello.html;\
         Hello|2024/03/10/newest.html|2023/06/01/older.html;\
         Older|2024/01/05/hello.html|;"
    );
}

#[test]
fn post_renders_through_layout() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    build(tmp.path()).unwrap();

    assert_eq!(
        read(&tmp.path().join("_site/2024/01/05/hello.html")),
        "<article><h1>Hello</h1><p>2024-01-05</p></article>"
    );
    assert_eq!(read(&tmp.path().join("_site/2023/06/01/older.html")), "old");
}

#[test]
fn static_files_are_copied_and_text_is_rendered() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    write(&tmp.path().join("_config.yml"), "color: \"<red>\"\n");
    build(tmp.path()).unwrap();

    let out = tmp.path().join("_site");
    assert_eq!(read(&out.join("robots.txt")), "User-agent: *");
    // No HTML escaping outside HTML documents
    assert_eq!(read(&out.join("css/site.css")), "body { color: <red>; }");
    assert!(!out.join("_config.yml").exists());
    assert!(!out.join("_layouts").exists());
    assert!(!out.join("_posts").exists());
}

#[test]
fn listing_produces_page_and_both_images() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    let report = build(tmp.path()).unwrap();

    let out = tmp.path().join("_site/gallery/42");
    assert_eq!(read(&out.join("my-shot.html")), "<img src=\"/gallery/42/my-shot.jpg\">");

    let main = image::open(out.join("my-shot.jpg")).unwrap();
    assert_eq!((main.width(), main.height()), (20, 15));
    let thumb = image::open(out.join("my-shot_thumb.jpg")).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (8, 6));

    assert_eq!(report.images.encoded, 1);
    assert_eq!(report.images.cached, 0);
    assert!(report.collections.contains(&("gallery".to_string(), 1)));
}

// =========================================================================
// Image cache
// =========================================================================

#[test]
fn fresh_cache_is_reused_byte_for_byte() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    build(tmp.path()).unwrap();
    let main = tmp.path().join("_site/gallery/42/my-shot.jpg");
    let thumb = tmp.path().join("_site/gallery/42/my-shot_thumb.jpg");
    let first = (fs::read(&main).unwrap(), fs::read(&thumb).unwrap());

    let report = build(tmp.path()).unwrap();
    assert_eq!(report.images.cached, 1);
    assert_eq!(report.images.encoded, 0);
    assert_eq!(fs::read(&main).unwrap(), first.0);
    assert_eq!(fs::read(&thumb).unwrap(), first.1);
}

#[test]
fn stale_cache_is_re_encoded() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    build(tmp.path()).unwrap();

    let source = tmp.path().join("_gallery/42-my-shot.png");
    write_png(&source, 60, 30);
    fs::File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(3600))
        .unwrap();

    let report = build(tmp.path()).unwrap();
    assert_eq!(report.images.encoded, 1);
    let main = image::open(tmp.path().join("_site/gallery/42/my-shot.jpg")).unwrap();
    assert_eq!((main.width(), main.height()), (20, 10));
    assert!(tmp.path().join("_site/gallery/42/my-shot_thumb.jpg").exists());
}

#[test]
fn separate_cache_dir_is_consulted() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    let options = BuildOptions {
        output: Some(tmp.path().join("_www")),
        ..BuildOptions::new(tmp.path())
    };
    let registry = GeneratorRegistry::with_builtins().unwrap();
    site::build(&options, &registry).unwrap();

    let options = BuildOptions {
        output: Some(tmp.path().join("_www2")),
        cache_dir: Some(tmp.path().join("_www")),
        ..BuildOptions::new(tmp.path())
    };
    let report = site::build(&options, &registry).unwrap();
    assert_eq!(report.images.cached, 1);
    assert!(tmp.path().join("_www2/gallery/42/my-shot.jpg").exists());
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn write_failure_leaves_published_site_intact() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    build(tmp.path()).unwrap();
    let index_before = read(&tmp.path().join("_site/index.html"));

    write(
        &tmp.path().join("broken.html"),
        "---\nlayout: missing\n---\nbroken",
    );
    write(&tmp.path().join("index.html"), "changed");
    let err = build(tmp.path()).unwrap_err();
    assert!(matches!(err, BuildError::Content(_)), "{err}");

    assert_eq!(read(&tmp.path().join("_site/index.html")), index_before);
    assert!(!tmp.path().join("_site/broken.html").exists());
    assert_eq!(staging_entries(tmp.path()), 1);

    // The next successful build removes the failed staging directory and
    // the previous output it moved aside.
    fs::remove_file(tmp.path().join("broken.html")).unwrap();
    let report = build(tmp.path()).unwrap();
    assert_eq!(report.stale_removed, 2);
    assert_eq!(staging_entries(tmp.path()), 0);
    assert_eq!(read(&tmp.path().join("_site/index.html")), "changed");
}

#[test]
fn bad_post_date_fails_the_build() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("_posts/2024-13-99-x.html"), "x");

    let err = build(tmp.path()).unwrap_err();
    match &err {
        BuildError::Collection(CollectionError::Generate { collection, path, source }) => {
            assert_eq!(collection, "posts");
            assert!(path.contains("2024-13-99-x.html"));
            assert!(matches!(
                source,
                GenerateError::Name(NameError::BadDate(stem)) if stem == "2024-13-99-x"
            ));
        }
        other => panic!("expected a generate error, got {other}"),
    }
    assert!(err.to_string().contains("2024-13-99-x"));
    assert!(!tmp.path().join("_site").exists());
}

#[test]
fn listing_without_image_fails_the_build() {
    let tmp = TempDir::new().unwrap();
    write(
        &tmp.path().join("_config.yml"),
        "collections:\n  gallery:\n    generator: listing\n",
    );
    write(&tmp.path().join("_gallery/7-lonely.html"), "x");

    let err = build(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("7-lonely"), "{err}");
    assert!(!tmp.path().join("_site").exists());
}

#[test]
fn unknown_extensions_in_collections_are_ignored() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("_posts/2024-01-05-hello.html"), "hi");
    write(&tmp.path().join("_posts/notes.txt"), "scratch");
    write(&tmp.path().join("_posts/2024-01-06-draft.md"), "draft");

    let report = build(tmp.path()).unwrap();
    assert_eq!(report.collections, [("posts".to_string(), 1)]);
    assert!(tmp.path().join("_site/2024/01/05/hello.html").exists());
    assert!(!tmp.path().join("_site/2024/01/06").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_directory_is_published() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("site");
    write(&tmp.path().join("shared/logo.txt"), "logo");
    write(&root.join("index.html"), "hi");
    std::os::unix::fs::symlink(tmp.path().join("shared"), root.join("assets")).unwrap();

    let report = build(&root).unwrap();
    assert_eq!(report.directories, 1);
    let published = root.join("_site/assets");
    assert!(!fs::symlink_metadata(&published).unwrap().file_type().is_symlink());
    assert_eq!(read(&published.join("logo.txt")), "logo");
}

// =========================================================================
// Staging and check
// =========================================================================

#[test]
fn stale_staging_directories_are_removed() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("index.html"), "hi");
    write(&tmp.path().join("_tmpsite_crashed/index.html"), "old");
    write(&tmp.path().join("_tmpsite_other_old/x"), "old");

    let report = build(tmp.path()).unwrap();
    assert_eq!(report.stale_removed, 2);
    assert_eq!(staging_entries(tmp.path()), 0);
    assert_eq!(read(&tmp.path().join("_site/index.html")), "hi");
}

#[test]
fn check_validates_without_writing() {
    let tmp = TempDir::new().unwrap();
    blog(tmp.path());
    let registry = GeneratorRegistry::with_builtins().unwrap();

    let report = site::check(&BuildOptions::new(tmp.path()), &registry).unwrap();
    assert_eq!(report.layouts, 1);
    assert!(report.collections.contains(&("posts".to_string(), 3)));
    assert!(!tmp.path().join("_site").exists());
    assert_eq!(staging_entries(tmp.path()), 0);

    write(&tmp.path().join("_posts/2024-13-99-x.html"), "x");
    assert!(site::check(&BuildOptions::new(tmp.path()), &registry).is_err());
}
