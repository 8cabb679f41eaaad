//! End-to-end runs of the prebuilt pipeline against a local HTTP server.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use doxy_core::io::dmg::{DMG_PAYLOAD, VolumeMounter};
use doxy_core::io::download::DownloadError;
use doxy_core::{ErrorKind, NullReporter, Recipe, RecipeError, Reporter};
use doxy_schema::{Arch, Os, PACKAGE_INFO_FILE, PackageInfo, Platform, RecipeConfig, Sha256Digest};
use mockito::Server;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

fn sha256(data: &[u8]) -> Sha256Digest {
    Sha256Digest::new(hex::encode(Sha256::digest(data))).unwrap()
}

fn linux_tarball(version: &str) -> Vec<u8> {
    let enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(enc);
    let entries: [(&str, &[u8], u32); 4] = [
        ("bin/doxygen", b"\x7fELF doxygen", 0o755),
        ("bin/doxyindexer", b"\x7fELF doxyindexer", 0o755),
        ("bin/doxysearch.cgi", b"\x7fELF doxysearch", 0o755),
        ("html/index.html", b"<html></html>", 0o644),
    ];
    for (name, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("doxygen-{version}/{name}"), data)
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn windows_zip() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::SimpleFileOptions::default();
        for name in ["doxygen.exe", "doxyindexer.exe", "doxysearch.cgi.exe", "libclang.dll"] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(name.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf.into_inner()
}

fn config(server: &Server, version: &str, body: &[u8]) -> RecipeConfig {
    RecipeConfig {
        version: version.to_string(),
        binary_sha256: Some(sha256(body)),
        binary_base_url: server.url(),
        ..RecipeConfig::default()
    }
}

struct Dirs {
    _root: TempDir,
    work: PathBuf,
    out: PathBuf,
}

fn dirs() -> Dirs {
    let root = tempfile::tempdir().unwrap();
    Dirs {
        work: root.path().join("work"),
        out: root.path().join("out"),
        _root: root,
    }
}

fn bin_names(out: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(out.join("bin"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_linux_prebuilt_end_to_end() {
    let mut server = Server::new_async().await;
    let body = linux_tarball("1.8.20");
    let mock = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .expect(1)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    let outcome = Recipe::new(&config, Platform::new(Os::Linux, Arch::X86_64), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bin_names(&d.out), ["doxygen", "doxyindexer", "doxysearch.cgi"]);
    assert_eq!(outcome.bin_dir, d.out.join("bin"));
    assert_eq!(outcome.env.entries, vec![d.out.join("bin")]);
    assert!(!d.work.join("file.tar.gz").exists());

    let info: PackageInfo =
        serde_json::from_str(&std::fs::read_to_string(d.out.join(PACKAGE_INFO_FILE)).unwrap())
            .unwrap();
    assert_eq!(info.version, "1.8.20");
    assert_eq!(info.package_id, outcome.package_id);
    assert_eq!(info.files, outcome.artifacts);
    assert!(d.out.join("doxy-env.sh").is_file());
    assert!(d.out.join("doxy-env.bat").is_file());
}

#[tokio::test]
async fn test_freebsd_uses_unix_tarball() {
    let mut server = Server::new_async().await;
    let body = linux_tarball("1.8.20");
    let mock = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .expect(1)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    Recipe::new(&config, Platform::new(Os::FreeBsd, Arch::X86_64), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bin_names(&d.out), ["doxygen", "doxyindexer", "doxysearch.cgi"]);
}

#[tokio::test]
async fn test_rerun_produces_same_package() {
    let mut server = Server::new_async().await;
    let body = linux_tarball("1.8.20");
    let _m = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .expect(2)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    let platform = Platform::new(Os::Linux, Arch::Armv8);

    let first = Recipe::new(&config, platform, &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();
    let second = Recipe::new(&config, platform, &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();

    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.package_id, second.package_id);
    assert_eq!(bin_names(&d.out).len(), 3);
}

#[tokio::test]
async fn test_windows_zip_end_to_end() {
    let mut server = Server::new_async().await;
    let body = windows_zip();
    let _m = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.windows.bin.zip")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    let outcome = Recipe::new(&config, Platform::new(Os::Windows, Arch::X86), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();

    assert!(outcome.artifacts.contains("doxygen.exe"));
    assert!(outcome.artifacts.contains("libclang.dll"));
    assert!(!d.work.join("file.zip").exists());
}

#[tokio::test]
async fn test_prebuilt_checksum_mismatch_is_fatal() {
    let mut server = Server::new_async().await;
    let body = linux_tarball("1.8.20");
    let _m = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let d = dirs();
    let config = RecipeConfig {
        binary_sha256: Some(sha256(b"something else")),
        ..config(&server, "1.8.20", &body)
    };
    let err = Recipe::new(&config, Platform::new(Os::Linux, Arch::X86_64), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RecipeError::Download(DownloadError::HashMismatch { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Provisioning);
    assert!(!d.out.join("bin").exists());
    assert!(!d.work.join("doxygen-1.8.20").exists());
}

#[tokio::test]
async fn test_unsupported_platform_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", b"");
    let err = Recipe::new(&config, Platform::new(Os::Linux, Arch::X86), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, RecipeError::UnsupportedPlatform(_)));
}

#[tokio::test]
async fn test_archive_without_doxygen_is_packaging_error() {
    let mut server = Server::new_async().await;
    // A Linux tarball for another version: nothing lands in doxygen-1.8.20/bin
    let body = linux_tarball("1.8.19");
    let _m = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    let err = Recipe::new(&config, Platform::new(Os::Linux, Arch::X86_64), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, RecipeError::MissingExecutable { .. }));
    assert_eq!(err.kind(), ErrorKind::Packaging);
}

/// Serves the disk image payload from memory and records detaches.
#[derive(Default)]
struct FakeMounter {
    detached: Mutex<Vec<PathBuf>>,
}

impl VolumeMounter for FakeMounter {
    fn attach(&self, image: &Path, mount_point: &Path) -> std::io::Result<()> {
        assert!(image.ends_with("file.dmg"));
        for (dir, name) in DMG_PAYLOAD {
            let d = mount_point.join(dir);
            std::fs::create_dir_all(&d)?;
            std::fs::write(d.join(name), name.as_bytes())?;
        }
        Ok(())
    }

    fn detach(&self, mount_point: &Path) -> std::io::Result<()> {
        self.detached.lock().unwrap().push(mount_point.to_path_buf());
        Ok(())
    }
}

#[tokio::test]
async fn test_macos_disk_image_end_to_end() {
    let mut server = Server::new_async().await;
    let body = b"not really a disk image".to_vec();
    let _m = server
        .mock("GET", "/rel-1.8.20/Doxygen-1.8.20.dmg")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let d = dirs();
    let config = config(&server, "1.8.20", &body);
    let mounter = FakeMounter::default();
    let outcome = Recipe::new(&config, Platform::new(Os::Macos, Arch::Armv8), &NullReporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .with_mounter(&mounter)
        .run()
        .await
        .unwrap();

    assert_eq!(
        bin_names(&d.out),
        ["doxygen", "doxyindexer", "doxysearch.cgi", "libclang.dylib"]
    );
    assert_eq!(outcome.artifacts.len(), 4);
    assert_eq!(*mounter.detached.lock().unwrap(), vec![d.work.join("mnt")]);
    assert!(!d.work.join("mnt").exists());
    assert!(!d.work.join("file.dmg").exists());
}

/// Keeps warnings so tests can assert on them.
#[derive(Default)]
struct RecordingReporter {
    warnings: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str) {}
    fn done(&self, _: &str, _: &str) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, msg: &str) {
        self.warnings.lock().unwrap().push(msg.to_string());
    }
    fn error(&self, _: &str) {}
}

#[tokio::test]
async fn test_insecure_download_warns() {
    let mut server = Server::new_async().await;
    let body = linux_tarball("1.8.20");
    let _m = server
        .mock("GET", "/rel-1.8.20/doxygen-1.8.20.linux.bin.tar.gz")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let d = dirs();
    let config = RecipeConfig {
        verify_tls: false,
        binary_sha256: None,
        ..config(&server, "1.8.20", &body)
    };
    let reporter = RecordingReporter::default();
    Recipe::new(&config, Platform::new(Os::Linux, Arch::X86_64), &reporter)
        .with_workdir(&d.work)
        .with_output(&d.out)
        .run()
        .await
        .unwrap();

    let warnings = reporter.warnings.lock().unwrap();
    assert!(warnings.iter().any(|w| w.contains("TLS")));
}
