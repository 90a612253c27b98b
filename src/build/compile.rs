//! Sketch compilation pipeline
//!
//! Mirrors the classic AVR build: compile every core source and the sketch
//! with size-optimizing flags, link with section garbage collection, then
//! objcopy the ELF into the flashable ihex image and report avr-size.

use crate::build::{CoreLayout, Toolchain};
use crate::config::schema::BuildConfig;
use crate::error::{CorekitError, CorekitResult};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Arduino API level define baked into compiles
const ARDUINO_API_VERSION: &str = "10819";

/// Options for one sketch build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Target MCU (e.g. "atmega328p")
    pub mcu: String,
    /// CPU frequency in Hz
    pub f_cpu: u32,
    /// Board variant directory name
    pub variant: String,
}

impl BuildOptions {
    /// Build options from configuration defaults
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            mcu: config.mcu.clone(),
            f_cpu: config.f_cpu,
            variant: config.variant.clone(),
        }
    }
}

/// Outputs of a successful build
#[derive(Debug)]
pub struct BuildArtifacts {
    /// Linked ELF image
    pub elf: PathBuf,
    /// Flashable ihex image
    pub hex: PathBuf,
    /// Raw `avr-size` report for the ELF
    pub size_report: String,
}

/// Compiles a sketch against a provisioned core and toolchain
pub struct SketchBuilder {
    toolchain: Toolchain,
    core: CoreLayout,
    options: BuildOptions,
    build_dir: PathBuf,
}

impl SketchBuilder {
    pub fn new(
        toolchain: Toolchain,
        core: CoreLayout,
        options: BuildOptions,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            toolchain,
            core,
            options,
            build_dir: build_dir.into(),
        }
    }

    /// Compile `sketch` into an ELF and ihex image under the build directory.
    pub async fn compile(&self, sketch: &Path) -> CorekitResult<BuildArtifacts> {
        if !sketch.exists() {
            return Err(CorekitError::SketchNotFound(sketch.to_path_buf()));
        }
        self.toolchain.require()?;
        self.core.validate()?;

        let obj_dir = self.build_dir.join("obj");
        std::fs::create_dir_all(&obj_dir)
            .map_err(|e| CorekitError::io(format!("creating {}", obj_dir.display()), e))?;

        info!(sketch = %sketch.display(), mcu = %self.options.mcu, "Compiling sketch");

        let mut objects = Vec::new();
        for source in self.core.sources()? {
            objects.push(self.compile_one(&source, &obj_dir, false).await?);
        }
        objects.push(self.compile_one(sketch, &obj_dir, true).await?);

        let stem = sketch
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "sketch".to_string());
        let elf = self.build_dir.join(format!("{stem}.elf"));
        self.link(&objects, &elf).await?;

        let hex = self.build_dir.join(format!("{stem}.hex"));
        self.objcopy(&elf, &hex).await?;

        let size_report = self.size_report(&elf).await?;

        info!(hex = %hex.display(), "Build complete");
        Ok(BuildArtifacts {
            elf,
            hex,
            size_report,
        })
    }

    /// Compile a single translation unit into an object file
    async fn compile_one(&self, source: &Path, obj_dir: &Path, is_sketch: bool) -> CorekitResult<PathBuf> {
        let object = obj_dir.join(object_name(source));
        let is_cpp = is_sketch || source.extension().and_then(|e| e.to_str()) == Some("cpp");

        let compiler = if is_cpp {
            self.toolchain.gpp()
        } else {
            self.toolchain.gcc()
        };

        let mut args = self.common_flags();
        if is_cpp {
            args.extend(cpp_flags());
        }
        if is_sketch {
            // Sketches are C++ regardless of extension, with the core API
            // in scope without an explicit include
            args.push("-x".to_string());
            args.push("c++".to_string());
            args.push("-include".to_string());
            args.push("Arduino.h".to_string());
        }
        args.push("-c".to_string());
        args.push(source.display().to_string());
        args.push("-o".to_string());
        args.push(object.display().to_string());

        debug!(source = %source.display(), "Compiling");
        run(&compiler, &args).await?;
        Ok(object)
    }

    async fn link(&self, objects: &[PathBuf], elf: &Path) -> CorekitResult<()> {
        let mut args = vec![
            format!("-mmcu={}", self.options.mcu),
            "-Os".to_string(),
            "-Wl,--gc-sections".to_string(),
            "-o".to_string(),
            elf.display().to_string(),
        ];
        args.extend(objects.iter().map(|o| o.display().to_string()));
        args.push("-lm".to_string());

        debug!(elf = %elf.display(), objects = objects.len(), "Linking");
        run(&self.toolchain.gcc(), &args).await
    }

    async fn objcopy(&self, elf: &Path, hex: &Path) -> CorekitResult<()> {
        let args = vec![
            "-O".to_string(),
            "ihex".to_string(),
            "-R".to_string(),
            ".eeprom".to_string(),
            elf.display().to_string(),
            hex.display().to_string(),
        ];
        run(&self.toolchain.objcopy(), &args).await
    }

    async fn size_report(&self, elf: &Path) -> CorekitResult<String> {
        let program = self.toolchain.size_tool();
        let output = Command::new(&program)
            .arg("-A")
            .arg(elf)
            .output()
            .await
            .map_err(|e| CorekitError::command_failed(program.display().to_string(), e))?;

        if !output.status.success() {
            return Err(CorekitError::command_exec(
                format!("{} -A {}", program.display(), elf.display()),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Flags shared by every compile step
    fn common_flags(&self) -> Vec<String> {
        vec![
            "-Os".to_string(),
            "-Wall".to_string(),
            format!("-mmcu={}", self.options.mcu),
            format!("-DF_CPU={}UL", self.options.f_cpu),
            format!("-DARDUINO={ARDUINO_API_VERSION}"),
            "-ffunction-sections".to_string(),
            "-fdata-sections".to_string(),
            format!("-I{}", self.core.core_dir().display()),
            format!("-I{}", self.core.variant_dir(&self.options.variant).display()),
        ]
    }
}

fn cpp_flags() -> Vec<String> {
    vec![
        "-std=gnu++11".to_string(),
        "-fno-exceptions".to_string(),
        "-fno-threadsafe-statics".to_string(),
    ]
}

/// Object file name that keeps differently-typed sources apart
/// (wiring.c and wiring.cpp must not collide)
fn object_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "source".to_string());
    let ext = source
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{stem}_{ext}.o")
}

async fn run(program: &Path, args: &[String]) -> CorekitResult<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| CorekitError::command_failed(program.display().to_string(), e))?;

    if !output.status.success() {
        return Err(CorekitError::command_exec(
            format!("{} {}", program.display(), args.join(" ")),
            String::from_utf8_lossy(&output.stderr),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn builder(dir: &Path) -> SketchBuilder {
        SketchBuilder::new(
            Toolchain::new(dir.join("toolchain")),
            CoreLayout::new(dir.join("core")),
            BuildOptions {
                mcu: "atmega328p".to_string(),
                f_cpu: 16_000_000,
                variant: "standard".to_string(),
            },
            dir.join("build"),
        )
    }

    #[test]
    fn options_from_config() {
        let options = BuildOptions::from_config(&BuildConfig::default());
        assert_eq!(options.mcu, "atmega328p");
        assert_eq!(options.f_cpu, 16_000_000);
        assert_eq!(options.variant, "standard");
    }

    #[test]
    fn common_flags_cover_target_and_includes() {
        let temp = TempDir::new().unwrap();
        let flags = builder(temp.path()).common_flags();

        assert!(flags.contains(&"-mmcu=atmega328p".to_string()));
        assert!(flags.contains(&"-DF_CPU=16000000UL".to_string()));
        assert!(flags.iter().any(|f| f.starts_with("-I") && f.contains("cores")));
        assert!(flags.iter().any(|f| f.starts_with("-I") && f.contains("variants")));
    }

    #[test]
    fn object_names_keep_source_types_apart() {
        assert_eq!(object_name(Path::new("/core/wiring.c")), "wiring_c.o");
        assert_eq!(object_name(Path::new("/core/wiring.cpp")), "wiring_cpp.o");
        assert_eq!(object_name(Path::new("/core/asm.S")), "asm_S.o");
    }

    #[tokio::test]
    async fn missing_sketch_is_reported_first() {
        let temp = TempDir::new().unwrap();
        let err = builder(temp.path())
            .compile(Path::new("/nonexistent/blink.ino"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorekitError::SketchNotFound(_)));
    }

    #[tokio::test]
    async fn missing_toolchain_is_reported() {
        let temp = TempDir::new().unwrap();
        let sketch = temp.path().join("blink.ino");
        std::fs::write(&sketch, "void setup() {}\nvoid loop() {}\n").unwrap();

        let err = builder(temp.path()).compile(&sketch).await.unwrap_err();
        assert!(matches!(err, CorekitError::CompilerMissing(_)));
    }
}
