use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TEST_DIR: &str = "../tmp";

// RAII temp file under TEST_DIR; removed on drop even when the test fails.
// Give each test a distinct file name.
pub struct TestFile {
    pub path: PathBuf,
}

impl TestFile {
    pub fn new(name: &str) -> Self {
        if !Path::new(TEST_DIR).exists() {
            let _ = fs::create_dir_all(TEST_DIR);
        }
        Self {
            path: Path::new(TEST_DIR).join(name),
        }
    }

    pub fn write(name: &str, contents: &str) -> Self {
        let file = Self::new(name);
        let mut out = fs::File::create(&file.path).unwrap();
        out.write_all(contents.as_bytes()).unwrap();
        file
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_is_removed_on_drop() {
        let path = {
            let file = TestFile::write("test_utils_drop.csv", "a,b\n");
            assert!(file.path.exists());
            file.path.clone()
        };
        assert!(!path.exists());
    }
}
