//! Evaluation sessions: one store of binaries, one fresh host per
//! expression.

use crate::error::EvalError;
use crate::local_materializer::LiveVariable;
use crate::options::EvaluateOptions;
use crate::plugin::{EvalContext, ScopedDebugInfoPlugin, SynthesisStats};
use crate::store::DebugInfoStore;
use dbgeval_binder::ProgramId;
use dbgeval_checker::CompilerContext;
use dbgeval_common::diagnostics::Diagnostic;
use dbgeval_debuginfo::GLOBAL_CLASS_NAME;
use dbgeval_parser::parser::printer::print_node;
use std::rc::Rc;
use tracing::{Level, debug, info, span};

/// Declarations every evaluation sees: the root class and the runtime
/// accessors that read and write the suspended frame's registers.
pub const PRELUDE: &str = r#"declare class Object {}
declare class DebuggerAPI {
    static getLocalBoolean(slot: int): boolean;
    static getLocalByte(slot: int): byte;
    static getLocalChar(slot: int): char;
    static getLocalShort(slot: int): short;
    static getLocalInt(slot: int): int;
    static getLocalLong(slot: int): long;
    static getLocalFloat(slot: int): float;
    static getLocalDouble(slot: int): number;
    static getLocalObject(slot: int): Object;
    static setLocalBoolean(slot: int, value: boolean): void;
    static setLocalByte(slot: int, value: byte): void;
    static setLocalChar(slot: int, value: char): void;
    static setLocalShort(slot: int, value: short): void;
    static setLocalInt(slot: int, value: int): void;
    static setLocalLong(slot: int, value: long): void;
    static setLocalFloat(slot: int, value: float): void;
    static setLocalDouble(slot: int, value: number): void;
    static setLocalObject(slot: int, value: Object): void;
}
"#;

const PRELUDE_PATH: &str = "<prelude>.ets";

/// Name of the function wrapping the user's statements.
pub const EVALUATE_FUNCTION: &str = "__evaluate";

/// Result of one evaluation: the host after checking, with every
/// synthesized program still in it.
pub struct EvaluationOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub host: CompilerContext,
    pub eval_program: ProgramId,
    pub stats: SynthesisStats,
    pub plugin: ScopedDebugInfoPlugin,
}

impl EvaluationOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostic_codes(&self) -> Vec<u32> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    /// Source text of a program's statements, one per line.
    pub fn program_text(&self, program: ProgramId) -> String {
        self.host
            .program_statements(program)
            .into_iter()
            .map(|statement| print_node(&self.host.arena, statement))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The proxy program synthesized for `path`, if anything was.
    pub fn proxy_program(&self, path: &str) -> Option<ProgramId> {
        self.plugin.proxies().get_program(path)
    }
}

pub struct EvaluationSession {
    options: EvaluateOptions,
    store: Rc<DebugInfoStore>,
    context: EvalContext,
    locals: Vec<LiveVariable>,
}

impl EvaluationSession {
    /// Load the context binaries named by `options`.
    pub fn new(options: EvaluateOptions) -> Result<Self, EvalError> {
        let store = DebugInfoStore::load(&options.context_binaries)?;
        Self::with_store(options, Rc::new(store))
    }

    /// A session over binaries already loaded.
    pub fn with_store(options: EvaluateOptions, store: Rc<DebugInfoStore>) -> Result<Self, EvalError> {
        let module_name = match &options.module_name {
            Some(module) => module.clone(),
            None => store
                .get_module_name(&options.source_path)
                .ok_or_else(|| EvalError::UnknownSourcePath(options.source_path.clone()))?
                .to_string(),
        };
        let context = EvalContext {
            source_path: options.source_path.clone(),
            module_name,
            class_name: options.class_name.clone(),
            method_name: options.method_name.clone(),
            bytecode_offset: options.bytecode_offset,
        };
        let locals = breakpoint_locals(&store, &options);
        debug!(
            source = %context.source_path,
            module = %context.module_name,
            binaries = store.len(),
            locals = locals.len(),
            "evaluation session ready"
        );
        Ok(EvaluationSession {
            options,
            store,
            context,
            locals,
        })
    }

    pub fn options(&self) -> &EvaluateOptions {
        &self.options
    }

    pub fn store(&self) -> &Rc<DebugInfoStore> {
        &self.store
    }

    pub fn context(&self) -> &EvalContext {
        &self.context
    }

    /// Local-variable table of the breakpoint's method.
    pub fn live_variables(&self) -> &[LiveVariable] {
        &self.locals
    }

    /// Compile `source` (statements) at the breakpoint. Problems in the
    /// expression come back as diagnostics; an `Err` means the debug
    /// information or the synthesis state is broken.
    pub fn evaluate(&self, source: &str) -> Result<EvaluationOutcome, EvalError> {
        let _span = span!(Level::INFO, "evaluate", source = %self.context.source_path).entered();
        let mut host = CompilerContext::new();
        host.add_prelude(PRELUDE_PATH, PRELUDE);

        let eval_path = format!("{}#eval", self.context.source_path);
        let eval_module = format!("{}.__eval", self.context.module_name);
        let text = format!("function {EVALUATE_FUNCTION}(): void {{\n{source}\n}}\n");
        let eval_program = host.add_source(&eval_path, &eval_module, &text);

        let mut plugin = ScopedDebugInfoPlugin::new(Rc::clone(&self.store), self.context.clone());
        plugin.set_eval_program(eval_program);
        plugin.set_live_variables(self.locals.clone());

        plugin.pre_check(&mut host)?;
        host.check_program(&mut plugin, eval_program)?;
        plugin.post_check()?;

        let diagnostics = host.all_diagnostics();
        let stats = plugin.stats();
        info!(
            diagnostics = diagnostics.len(),
            classes = stats.classes,
            imports = stats.imports,
            locals = stats.locals,
            "evaluation checked"
        );
        Ok(EvaluationOutcome {
            diagnostics,
            host,
            eval_program,
            stats,
            plugin,
        })
    }
}

/// The local-variable table of the method the debuggee is stopped in, or
/// nothing when the options name no method or the binary lacks it.
fn breakpoint_locals(store: &DebugInfoStore, options: &EvaluateOptions) -> Vec<LiveVariable> {
    let Some((class_name, method_name)) = options.method_location() else {
        return Vec::new();
    };
    let path = options.source_path.as_str();
    let class = if class_name == GLOBAL_CLASS_NAME {
        store.global_class(path)
    } else {
        store.find_class(path, class_name)
    };
    let Some(binary) = store.get_binary(path).filter(|_| class.is_valid()) else {
        debug!(%class_name, %path, "breakpoint class not found");
        return Vec::new();
    };
    binary
        .methods(class)
        .into_iter()
        .find(|method| method.name() == method_name)
        .map(|method| {
            method
                .local_variable_table()
                .iter()
                .map(LiveVariable::from)
                .collect()
        })
        .unwrap_or_default()
}
