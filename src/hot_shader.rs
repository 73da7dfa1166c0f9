use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::gpu::GpuContext;
use crate::playground_pass::PlaygroundPass;
use crate::push_constant::PushConstant;
use crate::shader::ShaderError;

/// A shader source that can be hot-reloaded from disk.
pub struct HotShader {
    path: PathBuf,
    last_modified: SystemTime,
    source: String,
}

impl HotShader {
    /// Load a shader from the given file path.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = fs::read_to_string(&path)?;
        let last_modified = fs::metadata(&path)?.modified()?;

        Ok(Self {
            path,
            last_modified,
            source,
        })
    }

    /// Check if the shader file has been modified and reload if so.
    /// Returns `true` if the shader was reloaded.
    pub fn check_reload(&mut self) -> bool {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return false;
        };

        let Ok(modified) = metadata.modified() else {
            return false;
        };

        if modified > self.last_modified {
            if let Ok(source) = fs::read_to_string(&self.path) {
                self.source = source;
                self.last_modified = modified;
                return true;
            }
        }

        false
    }

    /// Get the current shader source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the shader file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The vertex and fragment files that make up one playground pipeline.
pub struct ShaderPair {
    pub vertex: HotShader,
    pub fragment: HotShader,
}

impl ShaderPair {
    pub fn new(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            vertex: HotShader::new(vertex)?,
            fragment: HotShader::new(fragment)?,
        })
    }

    /// Reloads both files; `true` if either changed.
    pub fn check_reload(&mut self) -> bool {
        // Both must be polled, so no short-circuit.
        let vertex = self.vertex.check_reload();
        let fragment = self.fragment.check_reload();
        vertex | fragment
    }

    pub fn paths(&self) -> [&Path; 2] {
        [self.vertex.path(), self.fragment.path()]
    }
}

/// Shader text that produced a working pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CompiledSources {
    vertex: String,
    fragment: String,
}

/// The newest pass built from a shader pair and the text it was built from.
///
/// A failed build leaves both untouched, so `sources` always matches `pass`.
struct LastGood<P> {
    pass: Option<P>,
    sources: Option<CompiledSources>,
}

impl<P> Default for LastGood<P> {
    fn default() -> Self {
        Self {
            pass: None,
            sources: None,
        }
    }
}

impl<P> LastGood<P> {
    /// Builds from the pair's current text. Returns `true` if a new pass was installed.
    fn update<E: fmt::Display>(
        &mut self,
        shaders: &ShaderPair,
        build: impl FnOnce(&str, &str) -> Result<P, E>,
    ) -> bool {
        let (vertex, fragment) = (shaders.vertex.source(), shaders.fragment.source());
        match build(vertex, fragment) {
            Ok(pass) => {
                self.pass = Some(pass);
                self.sources = Some(CompiledSources {
                    vertex: vertex.to_owned(),
                    fragment: fragment.to_owned(),
                });
                true
            }
            Err(e) => {
                log::warn!("[hot-reload] {e}");
                false
            }
        }
    }
}

/// A hot-reloadable playground pass.
///
/// Watches the shader pair and recompiles when either file changes. Falls back
/// to the last working pipeline if compilation fails.
pub struct HotPlaygroundPass {
    shaders: ShaderPair,
    compiled: LastGood<PlaygroundPass>,
}

impl HotPlaygroundPass {
    /// Loads both files and compiles them for the surface format.
    ///
    /// Only I/O errors fail here. A shader that does not compile is logged and
    /// the pass draws nothing until a fixed version is saved.
    pub fn new(
        gpu: &GpuContext,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let shaders = ShaderPair::new(vertex, fragment)?;
        let mut compiled = LastGood::default();
        compiled.update(&shaders, |v, f| PlaygroundPass::new(gpu, v, f));

        Ok(Self { shaders, compiled })
    }

    /// Check for shader changes and recompile if needed.
    /// Call this once per frame. Returns `true` if a new pipeline was installed.
    pub fn check_reload(&mut self, gpu: &GpuContext) -> bool {
        if !self.shaders.check_reload() {
            return false;
        }

        log::info!("[hot-reload] Reloading shaders: {:?}", self.shaders.paths());

        if self
            .compiled
            .update(&self.shaders, |v, f| PlaygroundPass::new(gpu, v, f))
        {
            log::info!("[hot-reload] Shaders compiled successfully");
            true
        } else {
            log::warn!("[hot-reload] Keeping previous version");
            false
        }
    }

    /// Compile the pipeline currently on screen for a different color target,
    /// e.g. a capture texture.
    ///
    /// Builds from the last sources that compiled, not from the files on disk.
    pub fn compile_for(
        &self,
        gpu: &GpuContext,
        format: wgpu::TextureFormat,
    ) -> Result<PlaygroundPass, ShaderError> {
        let Some(sources) = &self.compiled.sources else {
            return Err(ShaderError::Validation(
                "no shader pair has compiled yet".to_owned(),
            ));
        };
        PlaygroundPass::with_format(gpu, &sources.vertex, &sources.fragment, format)
    }

    /// Draw with the current pipeline, if any shader has compiled yet.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass, pc: &PushConstant) {
        if let Some(ref pass) = self.compiled.pass {
            pass.render(gpu, render_pass, pc);
        }
    }

    /// Files backing this pass.
    pub fn sources(&self) -> [&Path; 2] {
        self.shaders.paths()
    }

    /// Returns whether a valid shader is currently loaded.
    pub fn is_valid(&self) -> bool {
        self.compiled.pass.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trigon-hot-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn touch(path: &Path, contents: &str, ahead_secs: u64) {
        fs::write(path, contents).unwrap();
        // Push the mtime forward explicitly; coarse filesystem clocks may not tick.
        let later = SystemTime::now() + Duration::from_secs(ahead_secs);
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(later)
            .unwrap();
    }

    #[test]
    fn loads_source_and_path() {
        let path = scratch_file("load.wgsl", "// one");
        let shader = HotShader::new(&path).unwrap();
        assert_eq!(shader.source(), "// one");
        assert_eq!(shader.path(), path.as_path());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(HotShader::new("/definitely/not/here.wgsl").is_err());
    }

    #[test]
    fn reloads_only_after_modification() {
        let path = scratch_file("reload.wgsl", "// before");
        let mut shader = HotShader::new(&path).unwrap();
        assert!(!shader.check_reload());

        touch(&path, "// after", 5);
        assert!(shader.check_reload());
        assert_eq!(shader.source(), "// after");
        assert!(!shader.check_reload());
    }

    #[test]
    fn deleted_file_keeps_last_source() {
        let path = scratch_file("deleted.wgsl", "// keep me");
        let mut shader = HotShader::new(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(!shader.check_reload());
        assert_eq!(shader.source(), "// keep me");
    }

    #[test]
    fn pair_polls_both_files() {
        let vert = scratch_file("pair.vert.wgsl", "// v");
        let frag = scratch_file("pair.frag.wgsl", "// f");
        let mut pair = ShaderPair::new(&vert, &frag).unwrap();

        touch(&vert, "// v2", 5);
        touch(&frag, "// f2", 5);
        assert!(pair.check_reload());
        assert_eq!(pair.vertex.source(), "// v2");
        assert_eq!(pair.fragment.source(), "// f2");
        assert!(!pair.check_reload());
        assert_eq!(pair.paths(), [vert.as_path(), frag.as_path()]);
    }

    fn build(vertex: &str, fragment: &str) -> Result<(), ShaderError> {
        if vertex.contains("broken") || fragment.contains("broken") {
            Err(ShaderError::Validation("parse error".to_owned()))
        } else {
            Ok(())
        }
    }

    #[test]
    fn failed_build_keeps_last_good_sources() {
        let vert = scratch_file("good.vert.wgsl", "// v1");
        let frag = scratch_file("good.frag.wgsl", "// f1");
        let mut pair = ShaderPair::new(&vert, &frag).unwrap();
        let mut last = LastGood::default();

        assert!(last.update(&pair, build));

        touch(&frag, "// broken", 5);
        assert!(pair.check_reload());
        assert!(!last.update(&pair, build));
        assert!(last.pass.is_some());
        assert_eq!(
            last.sources,
            Some(CompiledSources {
                vertex: "// v1".to_owned(),
                fragment: "// f1".to_owned(),
            })
        );

        touch(&frag, "// f2", 10);
        assert!(pair.check_reload());
        assert!(last.update(&pair, build));
        assert_eq!(last.sources.unwrap().fragment, "// f2");
    }

    #[test]
    fn broken_first_build_has_nothing_to_fall_back_on() {
        let vert = scratch_file("first.vert.wgsl", "// v");
        let frag = scratch_file("first.frag.wgsl", "// broken");
        let pair = ShaderPair::new(&vert, &frag).unwrap();
        let mut last: LastGood<()> = LastGood::default();

        assert!(!last.update(&pair, build));
        assert!(last.pass.is_none());
        assert!(last.sources.is_none());
    }
}
