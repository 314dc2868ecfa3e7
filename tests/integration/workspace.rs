use smali_patcher::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp tree laid out like a real run: `apk_workdir/` plus
/// `patches/original` and `patches/patched`.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("apk_workdir")).unwrap();
        fs::create_dir_all(dir.path().join("patches/original")).unwrap();
        fs::create_dir_all(dir.path().join("patches/patched")).unwrap();
        Self { dir }
    }

    pub fn settings(&self, experimental: bool) -> Settings {
        Settings {
            target_dir: self.dir.path().join("apk_workdir"),
            patches_dir: self.dir.path().join("patches"),
            experimental,
            ..Settings::default()
        }
    }

    pub fn target(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join("apk_workdir").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    pub fn original(&self, name: &str, text: &str) {
        fs::write(
            self.dir
                .path()
                .join(format!("patches/original/{name}.smali-snippet")),
            text,
        )
        .unwrap();
    }

    pub fn patched(&self, name: &str, text: &str) {
        fs::write(
            self.dir
                .path()
                .join(format!("patches/patched/{name}.smali-snippet")),
            text,
        )
        .unwrap();
    }

    pub fn pair(&self, name: &str, original: &str, patched: &str) {
        self.original(name, original);
        self.patched(name, patched);
    }
}
