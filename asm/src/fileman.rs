use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use path_absolutize::Absolutize;

pub trait FileSystem {
    type Reader: Read;

    fn is_file(&self, path: &Path) -> io::Result<bool>;
    fn open_read(&self, path: &Path) -> io::Result<Self::Reader>;
}

pub struct RealFileSystem;

impl RealFileSystem {
    #[inline]
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    type Reader = File;

    #[inline]
    fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(path.is_file())
    }

    #[inline]
    fn open_read(&self, path: &Path) -> io::Result<Self::Reader> {
        File::open(path)
    }
}

pub struct FileManager<S> {
    file_system: S,
}

impl<S: FileSystem> FileManager<S> {
    #[inline]
    pub fn new(file_system: S) -> Self {
        Self { file_system }
    }

    /// `path` made absolute against `cwd`, with `.` and `..` folded away.
    pub fn absolute<C: AsRef<Path>, P: AsRef<Path>>(&self, cwd: C, path: P) -> io::Result<PathBuf> {
        Ok(path.as_ref().absolutize_from(cwd.as_ref())?.to_path_buf())
    }

    /// Reads a source file into lines. `Ok(None)` when there is no such file.
    pub fn read_lines<C: AsRef<Path>, P: AsRef<Path>>(
        &self,
        cwd: C,
        path: P,
    ) -> io::Result<Option<(PathBuf, Vec<String>)>> {
        let path = self.absolute(cwd, path)?;
        if !self.file_system.is_file(&path)? {
            return Ok(None);
        }
        let reader = BufReader::new(self.file_system.open_read(&path)?);
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Some((path, lines)))
    }
}
