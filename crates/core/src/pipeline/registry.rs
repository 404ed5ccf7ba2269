//! Generator contract and the registry that runs a configured sequence.
//!
//! A generator is a named unit with three operations invoked in a fixed
//! order: `prepare` (read-only inspection, caching), `render` (deterministic
//! content from the IR), `choose_strategy` (target path and write strategy,
//! or skip). The registry maps names to constructors at compile time:
//! registration happens by explicit call at process start, so the "named,
//! configured, ordered" extension model needs no runtime module loading.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

use tracing::debug;

use super::context::{Artifact, GenerationContext, WriteStrategy};

/// Free-form per-generator arguments from the configuration.
pub type GeneratorArgs = BTreeMap<String, String>;

/// One entry of the configured generator sequence.
#[derive(Debug, Clone)]
pub struct GeneratorSpec {
    pub name: String,
    pub args: GeneratorArgs,
}

/// The plugin contract every generator implements.
pub trait Generator {
    /// Read-only inspection of existing output (e.g. building a symbol
    /// index) and caching of directive decisions. Must not mutate the
    /// context.
    fn prepare(&mut self, _ctx: &GenerationContext) -> Result<(), String> {
        Ok(())
    }

    /// Pure computation from the IR (plus cached `prepare` state) to file
    /// content. Deterministic for identical inputs.
    fn render(&self, ctx: &GenerationContext) -> Result<String, String>;

    /// Target path and strategy for the rendered fragment; `None` discards
    /// the fragment (e.g. the file exists and force-overwrite is unset).
    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String>;
}

type Factory = fn(&GeneratorArgs) -> Box<dyn Generator>;

/// Compile-time registry mapping generator names to constructors.
pub struct Registry {
    factories: BTreeMap<&'static str, Factory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("generators", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, factory: Factory) {
        self.factories.insert(name, factory);
    }

    /// Registry with every built-in generator registered.
    pub fn builtin() -> Self {
        let mut registry = Registry::new();
        crate::generators::register_builtin(&mut registry);
        registry
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    fn create(&self, spec: &GeneratorSpec) -> Result<Box<dyn Generator>, String> {
        let factory = self
            .factories
            .get(spec.name.as_str())
            .ok_or_else(|| format!("Generator {} is not registered", spec.name))?;
        Ok(factory(&spec.args))
    }

    /// Run the configured sequence strictly in order.
    ///
    /// The context moves through by replacement; each generator's artifacts
    /// append to it. A fault (error or panic) inside any of the three phases
    /// is converted into an error tagged with the generator name and aborts
    /// the remaining pipeline.
    pub fn run(
        &self,
        mut ctx: GenerationContext,
        sequence: &[GeneratorSpec],
    ) -> Result<GenerationContext, String> {
        for spec in sequence {
            let mut generator = self.create(spec)?;
            debug!(generator = %spec.name, "Running generator.");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                run_generator(generator.as_mut(), &ctx)
            }))
            .map_err(|payload| {
                format!(
                    "Recovered panic from generator {}: {}",
                    spec.name,
                    panic_message(payload.as_ref())
                )
            })?;
            let artifact = outcome
                .map_err(|err| format!("Generator {} returned an error: {err}", spec.name))?;
            match artifact {
                Some((path, content, strategy)) => {
                    ctx.artifacts.push(Artifact {
                        path,
                        content,
                        strategy,
                        producer: spec.name.clone(),
                    });
                }
                None => debug!(generator = %spec.name, "Generator skipped its artifact."),
            }
        }
        Ok(ctx)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

fn run_generator(
    generator: &mut dyn Generator,
    ctx: &GenerationContext,
) -> Result<Option<(PathBuf, String, WriteStrategy)>, String> {
    generator.prepare(ctx)?;
    let content = generator.render(ctx)?;
    match generator.choose_strategy(ctx)? {
        Some((path, strategy)) => Ok(Some((path, content, strategy))),
        None => Ok(None),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::{InterfaceIR, validate_interface};
    use crate::pipeline::context::SourceLocation;

    fn test_ctx() -> GenerationContext {
        let ir = InterfaceIR {
            name: "Adder".to_string(),
            methods: Vec::new(),
            directives: Vec::new(),
        };
        validate_interface(&ir).unwrap();
        GenerationContext::new(
            ir,
            SourceLocation {
                source_dir: PathBuf::from("."),
                output_dir: PathBuf::from("."),
                import_path: "example.com/adder".to_string(),
                package_name: "adder".to_string(),
                force: false,
            },
        )
    }

    struct Fixed(&'static str);

    impl Generator for Fixed {
        fn render(&self, _ctx: &GenerationContext) -> Result<String, String> {
            Ok(self.0.to_string())
        }

        fn choose_strategy(
            &self,
            _ctx: &GenerationContext,
        ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
            Ok(Some((
                PathBuf::from(format!("{}.go", self.0)),
                WriteStrategy::AlwaysOverwrite,
            )))
        }
    }

    struct Panics;

    impl Generator for Panics {
        fn render(&self, _ctx: &GenerationContext) -> Result<String, String> {
            panic!("boom");
        }

        fn choose_strategy(
            &self,
            _ctx: &GenerationContext,
        ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
            Ok(None)
        }
    }

    fn spec(name: &str) -> GeneratorSpec {
        GeneratorSpec {
            name: name.to_string(),
            args: GeneratorArgs::new(),
        }
    }

    #[test]
    fn test_unregistered_name_is_config_error() {
        let registry = Registry::new();
        let err = registry.run(test_ctx(), &[spec("nope")]).unwrap_err();
        assert!(err.contains("nope is not registered"));
    }

    #[test]
    fn test_sequence_runs_in_order_and_accumulates() {
        let mut registry = Registry::new();
        registry.register("first", |_| Box::new(Fixed("first")));
        registry.register("second", |_| Box::new(Fixed("second")));
        let ctx = registry
            .run(test_ctx(), &[spec("first"), spec("second")])
            .unwrap();
        assert_eq!(ctx.artifacts.len(), 2);
        assert_eq!(ctx.artifacts[0].producer, "first");
        assert_eq!(ctx.artifacts[1].producer, "second");
    }

    #[test]
    fn test_panic_is_isolated_and_tagged() {
        let mut registry = Registry::new();
        registry.register("bad", |_| Box::new(Panics));
        registry.register("after", |_| Box::new(Fixed("after")));
        let err = registry
            .run(test_ctx(), &[spec("bad"), spec("after")])
            .unwrap_err();
        assert!(err.contains("Recovered panic from generator bad"), "{err}");
        assert!(err.contains("boom"));
    }

    #[test]
    fn test_builtin_names() {
        let names = Registry::builtin().names();
        for expected in [
            "middleware",
            "logging",
            "recovering",
            "tracing",
            "transport-jsonrpc",
            "stub-service",
            "type-converters",
            "cmd-main",
        ] {
            assert!(names.contains(&expected), "missing generator {expected}");
        }
    }
}
