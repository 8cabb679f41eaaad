//! DMG handling via hdiutil
//!
//! The macOS release ships as a disk image containing `Doxygen.app`. The
//! image is attached at a fixed mount point, four files are copied out, and
//! the volume is ejected again. [`MountedVolume`] detaches on drop, so the
//! eject happens on every exit path, including a failed copy.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::RecipeError;

/// Files copied out of the mounted image: `(directory inside the volume, file)`.
pub const DMG_PAYLOAD: &[(&str, &str)] = &[
    ("Doxygen.app/Contents/Resources", "doxygen"),
    ("Doxygen.app/Contents/Resources", "doxyindexer"),
    ("Doxygen.app/Contents/Resources", "doxysearch.cgi"),
    ("Doxygen.app/Contents/Frameworks", "libclang.dylib"),
];

/// Attaches and detaches disk images.
pub trait VolumeMounter {
    /// Attach `image` with its volume at `mount_point` (an existing directory).
    fn attach(&self, image: &Path, mount_point: &Path) -> std::io::Result<()>;

    /// Eject the volume mounted at `mount_point`.
    fn detach(&self, mount_point: &Path) -> std::io::Result<()>;
}

/// Production mounter backed by `hdiutil` and `diskutil`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdiutil;

impl VolumeMounter for Hdiutil {
    fn attach(&self, image: &Path, mount_point: &Path) -> std::io::Result<()> {
        let output = Command::new("hdiutil")
            .arg("attach")
            .arg("-nobrowse")
            .arg("-readonly")
            .arg("-mountpoint")
            .arg(mount_point)
            .arg(image)
            .output()?;

        if !output.status.success() {
            return Err(std::io::Error::other(format!(
                "hdiutil attach failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    fn detach(&self, mount_point: &Path) -> std::io::Result<()> {
        // Retry: a volume that was just read from is often briefly busy
        for _ in 0..3 {
            let status = Command::new("diskutil")
                .arg("eject")
                .arg(mount_point)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();

            if status.is_ok_and(|s| s.success()) {
                return Ok(());
            }
            std::thread::sleep(std::time::Duration::from_millis(500));
        }

        Err(std::io::Error::other(format!(
            "Failed to eject {}",
            mount_point.display()
        )))
    }
}

/// Represents a mounted DMG. Dropping this struct will detach the volume
/// and, once detached, remove the mount point directory.
pub struct MountedVolume<'a, M: VolumeMounter + ?Sized> {
    mounter: &'a M,
    path: PathBuf,
}

impl<M: VolumeMounter + ?Sized> std::fmt::Debug for MountedVolume<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedVolume")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<'a, M: VolumeMounter + ?Sized> MountedVolume<'a, M> {
    /// Create `mount_point` and attach `image` there.
    pub fn attach(mounter: &'a M, image: &Path, mount_point: &Path) -> Result<Self, RecipeError> {
        std::fs::create_dir_all(mount_point)?;
        if let Err(e) = mounter.attach(image, mount_point) {
            std::fs::remove_dir_all(mount_point).ok();
            return Err(RecipeError::DiskImage(e.to_string()));
        }
        tracing::debug!(mount_point = %mount_point.display(), "disk image attached");
        Ok(Self {
            mounter,
            path: mount_point.to_path_buf(),
        })
    }

    /// Root of the mounted volume.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<M: VolumeMounter + ?Sized> Drop for MountedVolume<'_, M> {
    fn drop(&mut self) {
        match self.mounter.detach(&self.path) {
            Ok(()) => {
                std::fs::remove_dir_all(&self.path).ok();
            }
            // Still mounted: leave the volume alone
            Err(e) => {
                tracing::warn!(mount_point = %self.path.display(), "detach failed: {e}");
            }
        }
    }
}

/// Mount `image` at `<dest>/mnt` and copy [`DMG_PAYLOAD`] into `dest`.
///
/// # Errors
///
/// Fails if the image cannot be attached or any payload file is missing.
/// The volume is detached either way.
pub fn unpack_dmg<M: VolumeMounter + ?Sized>(
    mounter: &M,
    image: &Path,
    dest: &Path,
) -> Result<Vec<PathBuf>, RecipeError> {
    let volume = MountedVolume::attach(mounter, image, &dest.join("mnt"))?;

    let mut copied = Vec::with_capacity(DMG_PAYLOAD.len());
    for (dir, name) in DMG_PAYLOAD {
        let src = volume.path().join(dir).join(name);
        let target = dest.join(name);
        std::fs::copy(&src, &target).map_err(|e| {
            RecipeError::DiskImage(format!("copying {} failed: {e}", src.display()))
        })?;
        copied.push(target);
    }

    Ok(copied)
}
