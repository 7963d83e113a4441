//! Program assembly: source files, native modules, and the shared node arena.

use tydl_common::diagnostics::Diagnostic;
use tydl_common::{Atom, Interner};
use tydl_parser::{NodeArena, NodeIndex, ParserState};

/// Kind of a native module export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeExportKind {
    Decorator,
    Function,
}

/// One host-implemented export of a native module.
#[derive(Clone, Copy, Debug)]
pub struct NativeExport {
    /// Binding name; decorator names carry the `@` prefix.
    pub name: Atom,
    pub kind: NativeExportKind,
}

/// A host-registered module of decorator/function implementations. The
/// binder materializes implementation symbols from this, and the merge
/// engine folds them with `extern` declarations from source.
#[derive(Clone, Debug)]
pub struct NativeModuleSpec {
    pub specifier: Atom,
    pub exports: Vec<NativeExport>,
}

/// A program under compilation: every parsed source file, every registered
/// native module, and the arena their nodes live in.
///
/// The arena is shared by all files so `NodeIndex` is unique program-wide;
/// it is immutable once resolution starts.
#[derive(Default)]
pub struct Program {
    pub arena: NodeArena,
    /// Script root nodes, in the order sources were added. This order is the
    /// deterministic file order used when merging exports.
    pub scripts: Vec<NodeIndex>,
    pub native_modules: Vec<NativeModuleSpec>,
    /// Parse diagnostics accumulated while adding sources.
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    /// Parse one source file into the program, returning its script node.
    pub fn add_source(&mut self, file_name: &str, source: &str) -> NodeIndex {
        let arena = std::mem::take(&mut self.arena);
        let mut parser = ParserState::with_arena(arena, file_name, source);
        let script = parser.parse_script();
        let (arena, diagnostics) = parser.into_parts();
        self.arena = arena;
        self.diagnostics.extend(diagnostics);
        self.scripts.push(script);
        script
    }

    /// Register a native module of host-implemented decorators/functions.
    ///
    /// Native modules merge into the global namespace before any source
    /// file, mirroring how host implementations must exist before the
    /// declarations that reference them.
    pub fn register_native_module(
        &mut self,
        specifier: &str,
        exports: &[(NativeExportKind, &str)],
    ) {
        let specifier = self.arena.intern(specifier);
        let exports = exports
            .iter()
            .map(|&(kind, name)| {
                let name = match kind {
                    NativeExportKind::Decorator => self.arena.intern(&format!("@{name}")),
                    NativeExportKind::Function => self.arena.intern(name),
                };
                NativeExport { name, kind }
            })
            .collect();
        self.native_modules.push(NativeModuleSpec { specifier, exports });
    }

    pub fn interner(&self) -> &Interner {
        self.arena.interner()
    }
}
