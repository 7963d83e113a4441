//! Symbol binding and name resolution for the tydl compiler.
//!
//! The resolver turns a parsed, immutable AST plus per-scope symbol tables
//! into a fully resolved reference graph: every identifier, qualified member
//! access, and alias is mapped to a canonical declaration, with
//! partial/unknown outcomes tracked explicitly for template-dependent cases.
//!
//! Name resolution never alters AST nodes or the symbols attached to them by
//! the binder, so both can be reused between compilations. All late-bound
//! state lives in structures owned by one [`Resolver`] instance per program
//! pass: merged symbols, copy-on-write symbol-table overlays, and node/symbol
//! link records. While we resolve many references here, we often cannot say
//! for sure that a name does *not* exist — members of a model template are
//! not known until instantiation — so such references resolve as "unknown"
//! for the checker to finish, rather than as hard errors.
//!
//! Resolution has three sub-phases, run by [`Resolver::resolve_program`]:
//!
//! 1. Merge namespace symbols and decorator/function
//!    declaration-implementation pairs across files.
//! 2. Resolve `using` directives and create scope-local bindings for the
//!    used namespaces' exports.
//! 3. Resolve type references and bind member containers, via a depth-first
//!    walk of the reference graph that recurses into whatever a reference
//!    depends on before completing the original reference. Link records
//!    memoize every outcome so no reference is resolved twice, and tri-state
//!    (unstarted / in-progress / done) guards turn cyclic dependencies into
//!    `CIRCULAR` results instead of unbounded recursion.

pub mod links;
pub mod program;
pub mod state;
pub mod symbols;
pub mod table;

mod resolver;
mod state_members;
mod state_merge;
mod state_references;
mod state_usings;

pub use links::{NodeLinks, ResolutionResult, SymbolLinks, result_flags};
pub use program::{NativeExport, NativeExportKind, NativeModuleSpec, Program};
pub use resolver::Resolver;
pub use state::BinderState;
pub use symbols::{Symbol, SymbolArena, SymbolId, symbol_flags};
pub use table::{SymbolTable, TableId, TableList};
