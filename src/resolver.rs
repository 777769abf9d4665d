//! Name and type resolution for top-level declarations.
//!
//! The resolver runs in passes over one file:
//!
//! 1. collect every top-level name into the package scope (named types get
//!    their [`Type`] handle right away, so they can refer to themselves);
//! 2. resolve each declaration in source order, following references to
//!    later declarations on demand;
//! 3. attach methods to their receiver types;
//! 4. report named types that could not be completed.
//!
//! A declaration that fails is reported once in [`Resolver::errors`] and the
//! others are still resolved. Results live in a [`NodeMap`] keyed by the
//! declaring name node.

use std::fmt;

use gofront_parser::escape::unquote;
use gofront_parser::{Ast, DiagKind, Error, File, NodeId, NodeMap, Token};
use gofront_types::{assignable_to, ChanDir, Kind, Method, Type, TypeError, TypeTable};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::ParsedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjClass {
    Builtin,
    Const,
    Func,
    Package,
    Type,
    Var,
}

impl fmt::Display for ObjClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjClass::Builtin => "built-in function",
            ObjClass::Const => "constant",
            ObjClass::Func => "func",
            ObjClass::Package => "package",
            ObjClass::Type => "type",
            ObjClass::Var => "variable",
        })
    }
}

/// Value of a constant: its kind (untyped for literals) and literal text.
/// No arithmetic is performed on constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstValue {
    pub kind: Kind,
    pub lit: String,
}

impl ConstValue {
    pub fn new(kind: Kind, lit: impl Into<String>) -> Self {
        Self {
            kind,
            lit: lit.into(),
        }
    }

    pub fn is_untyped(&self) -> bool {
        self.kind.is_untyped()
    }
}

/// A declared entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub name: String,
    pub class: ObjClass,
    pub ty: Option<Type>,
    pub value: Option<ConstValue>,
    /// Declaring spec; `None` for predeclared objects.
    pub decl: Option<NodeId>,
}

impl Object {
    pub fn new(name: impl Into<String>, class: ObjClass, decl: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            class,
            ty: None,
            value: None,
            decl,
        }
    }

    fn predeclared(name: &str, class: ObjClass, ty: Type) -> Self {
        Self {
            ty: Some(ty),
            ..Self::new(name, class, None)
        }
    }
}

/// Object for a builtin function such as `len` or `append`.
pub fn new_builtin_obj(types: &TypeTable, name: &str, nin: u32, nout: u32, variadic: bool) -> Object {
    Object::predeclared(name, ObjClass::Builtin, types.new_builtin(name, nin, nout, variadic))
}

/// (name, inputs, outputs, variadic)
const BUILTINS: &[(&str, u32, u32, bool)] = &[
    ("append", 1, 1, true),
    ("cap", 1, 1, false),
    ("close", 1, 0, false),
    ("complex", 2, 1, false),
    ("copy", 2, 1, false),
    ("delete", 2, 0, false),
    ("imag", 1, 1, false),
    ("len", 1, 1, false),
    ("make", 1, 1, true),
    ("new", 1, 1, false),
    ("panic", 1, 0, false),
    ("print", 0, 0, true),
    ("println", 0, 0, true),
    ("real", 1, 1, false),
    ("recover", 0, 1, false),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Resolving,
    Done,
}

/// A package-level name.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Name node; key of the object.
    name: NodeId,
    /// Type spec, value spec, func declaration or import spec.
    spec: NodeId,
    class: ObjClass,
}

struct Cx<'a> {
    ast: &'a Ast,
    file: &'a File,
}

pub struct Resolver<'t> {
    types: &'t TypeTable,
    pkg_path: String,
    universe: FxHashMap<&'static str, Object>,
    scope: FxHashMap<String, Entry>,
    /// Declarations in source order, one per spec.
    order: Vec<Entry>,
    states: FxHashMap<NodeId, State>,
    objects: NodeMap<Object>,
    /// (receiver type name, method name)
    methods: FxHashSet<(String, String)>,
    errors: Vec<ResolveError>,
}

impl<'t> Resolver<'t> {
    pub fn new(types: &'t TypeTable) -> Self {
        Self {
            types,
            pkg_path: String::new(),
            universe: universe(types),
            scope: FxHashMap::default(),
            order: Vec::new(),
            states: FxHashMap::default(),
            objects: NodeMap::new(),
            methods: FxHashSet::default(),
            errors: Vec::new(),
        }
    }

    pub fn types(&self) -> &'t TypeTable {
        self.types
    }

    /// Package name from the `package` clause of the last resolved file.
    pub fn pkg_path(&self) -> &str {
        &self.pkg_path
    }

    /// Diagnostics of the last resolved file, one per failing declaration.
    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    /// Object declared by a name node.
    pub fn object(&self, node: NodeId) -> Option<&Object> {
        self.objects.get(node)
    }

    pub fn objects(&self) -> &NodeMap<Object> {
        &self.objects
    }

    /// Package scope first, then the universe.
    pub fn lookup(&self, name: &str) -> Option<&Object> {
        match self.scope.get(name) {
            Some(entry) => self.objects.get(entry.name),
            None => self.universe.get(name),
        }
    }

    pub fn resolve(&mut self, parsed: &ParsedFile) -> Result<(), ResolveError> {
        self.resolve_file(&parsed.ast, &parsed.file, &parsed.decls())
    }

    /// Resolves the top-level declarations of one file as a package scope of
    /// its own; state from a previous file is discarded.
    ///
    /// Returns `Err` only for a [`ResolveError::Contract`] failure.
    #[tracing::instrument(level = "debug", skip_all, fields(file = file.name(), decls = decls.len()))]
    pub fn resolve_file(&mut self, ast: &Ast, file: &File, decls: &[NodeId]) -> Result<(), ResolveError> {
        self.reset();
        let cx = Cx { ast, file };

        self.pkg_path = decls
            .iter()
            .find(|&&d| ast.op(d) == Token::Package && !ast.node(d).is_bad())
            .and_then(|&d| ast.children(d).first().copied().flatten())
            .map_or_else(|| "main".to_string(), |name| ast.lit(name).to_string());

        let mut method_decls = Vec::new();
        for &decl in decls {
            self.collect(&cx, decl, &mut method_decls);
        }
        for entry in self.order.clone() {
            self.ensure(&cx, entry)?;
        }
        for decl in method_decls {
            let res = self.declare_method(&cx, decl);
            self.isolate(res)?;
        }
        self.check_complete(&cx);

        debug!(
            pkg = %self.pkg_path,
            objects = self.objects.len(),
            errors = self.errors.len(),
            "file resolved"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.scope.clear();
        self.order.clear();
        self.states.clear();
        self.objects = NodeMap::new();
        self.methods.clear();
        self.errors.clear();
    }

    fn diag(&self, cx: &Cx<'_>, at: NodeId, msg: impl Into<String>) -> ResolveError {
        let err = Error::new(DiagKind::Resolve, cx.file, cx.ast.pos(at), msg);
        ResolveError::Diagnostic(Box::new(err))
    }

    /// Source-caused constructor failures become diagnostics; the rest are
    /// contract violations.
    fn type_diag(&self, cx: &Cx<'_>, at: NodeId, err: TypeError) -> ResolveError {
        match err {
            TypeError::ArrayTooLarge { .. }
            | TypeError::DuplicateMethod(_)
            | TypeError::NotAnInterface(_)
            | TypeError::IncompleteEmbedded(_) => self.diag(cx, at, err.to_string()),
            err => ResolveError::Contract(err),
        }
    }

    fn isolate(&mut self, res: Result<(), ResolveError>) -> Result<(), ResolveError> {
        match res {
            Err(ResolveError::Diagnostic(err)) => {
                debug!(%err, "declaration failed");
                self.errors.push(ResolveError::Diagnostic(err));
                Ok(())
            }
            other => other,
        }
    }

    fn record(&mut self, err: ResolveError) {
        // Only diagnostics are built here.
        let _ = self.isolate(Err(err));
    }

    fn child(&self, cx: &Cx<'_>, id: NodeId, index: usize) -> Result<NodeId, ResolveError> {
        match cx.ast.at(id, index) {
            Ok(Some(c)) => Ok(c),
            _ => Err(self.diag(cx, id, format!("incomplete {}", cx.ast.render(id)))),
        }
    }

    fn method_pkg(&self, name: &str) -> String {
        if name.starts_with(|c: char| c.is_uppercase()) {
            String::new()
        } else {
            self.pkg_path.clone()
        }
    }

    // -------------------------------------------------------------------------
    // Pass 1: collect
    // -------------------------------------------------------------------------

    fn collect(&mut self, cx: &Cx<'_>, decl: NodeId, method_decls: &mut Vec<NodeId>) {
        let ast = cx.ast;
        if ast.node(decl).is_bad() {
            return;
        }
        let specs = || live_children(ast, decl);
        match ast.op(decl) {
            Token::Package => {}
            Token::Import => {
                for spec in specs() {
                    self.declare_import(cx, spec);
                }
            }
            op @ (Token::Const | Token::Var) => {
                let class = if op == Token::Const { ObjClass::Const } else { ObjClass::Var };
                for spec in specs().filter(|&s| ast.op(s) == Token::ValueSpec) {
                    let Some(names) = ast.children(spec).first().copied().flatten() else {
                        continue;
                    };
                    for &name in ast.children(names).iter().flatten() {
                        self.declare(cx, name, spec, class);
                    }
                }
            }
            Token::Type => {
                for spec in specs() {
                    let Some(name) = ast.children(spec).first().copied().flatten() else {
                        continue;
                    };
                    match ast.op(name) {
                        Token::Ident => self.declare(cx, name, spec, ObjClass::Type),
                        Token::Generic => {
                            let err = self.diag(cx, name, "generic type declarations are not supported");
                            self.record(err);
                        }
                        _ => {}
                    }
                }
            }
            Token::Func => {
                let kids = ast.children(decl);
                if kids.first().copied().flatten().is_some() {
                    method_decls.push(decl);
                    return;
                }
                match kids.get(1).copied().flatten() {
                    Some(name) if ast.op(name) == Token::Ident => self.declare(cx, name, decl, ObjClass::Func),
                    Some(name) if ast.op(name) == Token::Generic => {
                        let err = self.diag(cx, name, "generic functions are not supported");
                        self.record(err);
                    }
                    _ => {}
                }
            }
            op => trace!(%op, "not a declaration, skipped"),
        }
    }

    fn declare(&mut self, cx: &Cx<'_>, name_id: NodeId, spec: NodeId, class: ObjClass) {
        if cx.ast.node(name_id).is_bad() {
            return;
        }
        let name = cx.ast.lit(name_id).to_string();
        let mut obj = Object::new(&name, class, Some(spec));
        if class == ObjClass::Type && cx.ast.op(spec) == Token::Type {
            obj.ty = Some(self.types.new_named(&self.pkg_path, &name));
        }
        let entry = Entry {
            name: name_id,
            spec,
            class,
        };
        let blank = name == "_" || (class == ObjClass::Func && name == "init");
        if !blank {
            if self.scope.contains_key(&name) {
                let err = self.diag(cx, name_id, format!("{name} redeclared in this block"));
                self.record(err);
                return;
            }
            self.scope.insert(name.clone(), entry);
        }
        trace!(%name, %class, "declared");
        self.objects.insert(name_id, obj);
        if !self.states.contains_key(&spec) {
            self.states.insert(spec, State::Pending);
            self.order.push(entry);
        }
    }

    /// `B(IMPORT_SPEC, alias·, path)`; the package name defaults to the last
    /// path segment.
    fn declare_import(&mut self, cx: &Cx<'_>, spec: NodeId) {
        let ast = cx.ast;
        let kids = ast.children(spec);
        let (Some(alias), Some(path)) = (kids.first().copied(), kids.get(1).copied().flatten()) else {
            return;
        };
        let Some(path_str) = unquote(ast.lit(path)) else {
            return;
        };
        let (key, name) = match alias {
            Some(a) => (a, ast.node(a).atom.text().to_string()),
            None => (path, path_str.rsplit('/').next().unwrap_or_default().to_string()),
        };
        let obj = Object::new(&name, ObjClass::Package, Some(spec));
        if name != "_" && name != "." {
            if self.scope.contains_key(&name) {
                let err = self.diag(cx, key, format!("{name} redeclared in this block"));
                self.record(err);
                return;
            }
            self.scope.insert(
                name.clone(),
                Entry {
                    name: key,
                    spec,
                    class: ObjClass::Package,
                },
            );
        }
        trace!(%name, path = %path_str, "import declared");
        self.objects.insert(key, obj);
    }

    // -------------------------------------------------------------------------
    // Pass 2: resolve
    // -------------------------------------------------------------------------

    /// Resolves the declaration behind `entry` unless it is already done or
    /// in progress. Its own failure is recorded here, so callers only see
    /// contract errors.
    fn ensure(&mut self, cx: &Cx<'_>, entry: Entry) -> Result<(), ResolveError> {
        if self.states.get(&entry.spec) != Some(&State::Pending) {
            return Ok(());
        }
        self.states.insert(entry.spec, State::Resolving);
        let res = match entry.class {
            ObjClass::Type => self.resolve_type_spec(cx, entry),
            ObjClass::Const | ObjClass::Var => self.resolve_value_spec(cx, entry),
            ObjClass::Func => self.resolve_func(cx, entry),
            ObjClass::Builtin | ObjClass::Package => Ok(()),
        };
        self.states.insert(entry.spec, State::Done);
        if res.as_ref().is_err_and(ResolveError::is_diagnostic) && entry.class == ObjClass::Type {
            self.poison_type(entry)?;
        }
        self.isolate(res)
    }

    /// Gives a failed type declaration the invalid type, so that users of it
    /// do not report it again.
    fn poison_type(&mut self, entry: Entry) -> Result<(), ResolveError> {
        let invalid = self.types.invalid();
        let Some(obj) = self.objects.get_mut(entry.name) else {
            return Ok(());
        };
        let Some(t) = &obj.ty else {
            obj.ty = Some(invalid);
            return Ok(());
        };
        if t.pkg_path().is_some() && t.underlying().is_none() {
            t.set_underlying(&invalid)?;
        }
        Ok(())
    }

    /// Uses of a name: the package scope (resolving on demand), then the
    /// universe.
    fn use_ident(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<Object, ResolveError> {
        let name = cx.ast.lit(id);
        if name == "_" {
            return Err(self.diag(cx, id, "cannot use _ as value or type"));
        }
        if let Some(entry) = self.scope.get(name).copied() {
            self.ensure(cx, entry)?;
            if let Some(obj) = self.objects.get(entry.name) {
                return Ok(obj.clone());
            }
        }
        match self.universe.get(name) {
            Some(obj) => Ok(obj.clone()),
            None => Err(self.diag(cx, id, format!("undefined: {name}"))),
        }
    }

    /// `B(TYPE, name, type)` or alias `B(ASSIGN, name, type)`.
    fn resolve_type_spec(&mut self, cx: &Cx<'_>, entry: Entry) -> Result<(), ResolveError> {
        let typ = self.child(cx, entry.spec, 1)?;
        let under = self.resolve_type(cx, typ)?;
        let Some(obj) = self.objects.get_mut(entry.name) else {
            return Ok(());
        };
        match obj.ty.clone() {
            Some(named) => {
                if under.underlying().is_none() {
                    let name = obj.name.clone();
                    return Err(self.diag(cx, entry.name, format!("invalid recursive type {name}")));
                }
                named.set_underlying(&under)?;
                trace!(ty = %named, underlying = %under, "type resolved");
            }
            None => {
                trace!(alias = %obj.name, ty = %under, "alias resolved");
                obj.ty = Some(under);
            }
        }
        Ok(())
    }

    /// `L(VALUE_SPEC, [L(NAMES), type·, L(EXPRS)·])`.
    fn resolve_value_spec(&mut self, cx: &Cx<'_>, entry: Entry) -> Result<(), ResolveError> {
        let ast = cx.ast;
        let kids = ast.children(entry.spec);
        let names: Vec<NodeId> = match kids.first().copied().flatten() {
            Some(list) => ast.children(list).iter().flatten().copied().collect(),
            None => Vec::new(),
        };
        let values: Vec<NodeId> = match kids.get(2).copied().flatten() {
            Some(list) => ast.children(list).iter().flatten().copied().collect(),
            None => Vec::new(),
        };
        let declared = match kids.get(1).copied().flatten() {
            Some(t) => Some(self.resolve_type(cx, t)?),
            None => None,
        };

        if entry.class == ObjClass::Const {
            if values.is_empty() {
                return Err(self.diag(cx, entry.spec, "missing init expr for const declaration"));
            }
            if values.len() != names.len() {
                let msg = if values.len() < names.len() {
                    "missing init expr for const declaration"
                } else {
                    "extra init expr"
                };
                return Err(self.diag(cx, entry.spec, msg));
            }
            for (&name, &value) in names.iter().zip(&values) {
                let (mut v, mut vt) = self.const_value(cx, value)?;
                if let Some(t) = &declared {
                    if !is_invalid(t) && !assignable_to(&vt, t) {
                        return Err(self.diag(
                            cx,
                            value,
                            format!("cannot use {} ({vt} constant) as {t} value in constant declaration", v.lit),
                        ));
                    }
                    v.kind = t.kind();
                    vt = t.clone();
                }
                if let Some(obj) = self.objects.get_mut(name) {
                    trace!(name = %obj.name, value = %v.lit, ty = %vt, "constant resolved");
                    obj.value = Some(v);
                    obj.ty = Some(vt);
                }
            }
            return Ok(());
        }

        if !values.is_empty() && values.len() != names.len() {
            return Err(self.diag(
                cx,
                entry.spec,
                format!(
                    "assignment mismatch: {} variables but {} values",
                    names.len(),
                    values.len()
                ),
            ));
        }
        for (i, &name) in names.iter().enumerate() {
            let inferred = match values.get(i) {
                Some(&value) => self.value_type(cx, value)?.map(|t| (value, t)),
                None => None,
            };
            let ty = match (&declared, inferred) {
                (Some(t), Some((value, vt))) => {
                    if !is_invalid(t) && !assignable_to(&vt, t) {
                        return Err(self.diag(
                            cx,
                            value,
                            format!("cannot use {} ({vt} value) as {t} value in variable declaration", ast.render(value)),
                        ));
                    }
                    Some(t.clone())
                }
                (Some(t), None) => Some(t.clone()),
                (None, Some((value, vt))) => Some(self.default_type(cx, value, &vt)?),
                (None, None) => None,
            };
            if let Some(obj) = self.objects.get_mut(name) {
                trace!(name = %obj.name, ty = ?ty, "variable resolved");
                obj.ty = ty;
            }
        }
        Ok(())
    }

    /// Constant initializer: a literal, a parenthesized constant or the name
    /// of another constant.
    fn const_value(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<(ConstValue, Type), ResolveError> {
        let ast = cx.ast;
        if ast.node(id).is_bad() {
            return Err(self.diag(cx, id, "invalid constant initializer"));
        }
        let op = ast.op(id);
        if let Some(kind) = literal_kind(op) {
            return Ok((ConstValue::new(kind, ast.lit(id)), self.types.basic(kind)));
        }
        match op {
            Token::Ident => {
                let obj = self.use_ident(cx, id)?;
                match obj {
                    Object {
                        class: ObjClass::Const,
                        value: Some(v),
                        ty: Some(t),
                        ..
                    } => Ok((v, t)),
                    Object {
                        class: ObjClass::Const,
                        name,
                        ..
                    } => Err(self.diag(cx, id, format!("invalid constant initializer {name}"))),
                    Object { name, class, .. } => {
                        Err(self.diag(cx, id, format!("{name} ({class}) is not constant")))
                    }
                }
            }
            Token::LParen => {
                let inner = self.child(cx, id, 0)?;
                self.const_value(cx, inner)
            }
            Token::Period => Err(self.diag(
                cx,
                id,
                format!("qualified constant {} is not supported", ast.render(id)),
            )),
            Token::Call => Err(self.diag(
                cx,
                id,
                format!("constant conversion {} is not supported", ast.render(id)),
            )),
            op if op.is_operator() => Err(self.diag(
                cx,
                id,
                format!("constant folding not supported: {}", ast.render(id)),
            )),
            _ => Err(self.diag(cx, id, format!("{} is not constant", ast.render(id)))),
        }
    }

    /// Type of a variable initializer when it can be known without checking
    /// expressions: literals and names.
    fn value_type(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<Option<Type>, ResolveError> {
        let ast = cx.ast;
        if let Some(kind) = literal_kind(ast.op(id)) {
            return Ok(Some(self.types.basic(kind)));
        }
        match ast.op(id) {
            Token::Ident => {
                let obj = self.use_ident(cx, id)?;
                match obj.class {
                    ObjClass::Const | ObjClass::Var | ObjClass::Func => Ok(obj.ty),
                    ObjClass::Builtin => Err(self.diag(
                        cx,
                        id,
                        format!("{} (built-in function) must be called", obj.name),
                    )),
                    ObjClass::Type => Err(self.diag(cx, id, format!("{} (type) is not an expression", obj.name))),
                    ObjClass::Package => Err(self.diag(cx, id, format!("use of package {} without selector", obj.name))),
                }
            }
            Token::LParen => {
                let inner = self.child(cx, id, 0)?;
                self.value_type(cx, inner)
            }
            _ => Ok(None),
        }
    }

    /// Type a variable takes from an untyped initializer.
    fn default_type(&self, cx: &Cx<'_>, at: NodeId, t: &Type) -> Result<Type, ResolveError> {
        let kind = match t.kind() {
            Kind::UntypedBool => Kind::Bool,
            Kind::UntypedInt => Kind::Int,
            Kind::UntypedRune => Kind::Int32,
            Kind::UntypedFloat => Kind::Float64,
            Kind::UntypedComplex => Kind::Complex128,
            Kind::UntypedString => Kind::String,
            Kind::UntypedNil => return Err(self.diag(cx, at, "use of untyped nil in variable declaration")),
            _ => return Ok(t.clone()),
        };
        Ok(self.types.basic(kind))
    }

    /// `L(FUNC, [·, name, signature, body·])`.
    fn resolve_func(&mut self, cx: &Cx<'_>, entry: Entry) -> Result<(), ResolveError> {
        let sig_node = self.child(cx, entry.spec, 2)?;
        let sig = self.resolve_type(cx, sig_node)?;
        let Some(obj) = self.objects.get_mut(entry.name) else {
            return Ok(());
        };
        let special = obj.name == "init" || (obj.name == "main" && self.pkg_path == "main");
        if special && (sig.num_in() > 0 || sig.num_out() > 0) {
            let name = obj.name.clone();
            return Err(self.diag(
                cx,
                entry.name,
                format!("func {name} must have no arguments and no return values"),
            ));
        }
        trace!(name = %obj.name, ty = %sig, "func resolved");
        obj.ty = Some(sig);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Type expressions
    // -------------------------------------------------------------------------

    fn resolve_type(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<Type, ResolveError> {
        let ast = cx.ast;
        if ast.node(id).is_bad() {
            // Already reported by the parser.
            return Ok(self.types.invalid());
        }
        let t = match ast.op(id) {
            Token::Ident => {
                let obj = self.use_ident(cx, id)?;
                if obj.class != ObjClass::Type {
                    return Err(self.diag(cx, id, format!("{} is not a type", obj.name)));
                }
                return obj
                    .ty
                    .ok_or_else(|| self.diag(cx, id, format!("invalid recursive type {}", obj.name)));
            }
            Token::LParen => {
                let inner = self.child(cx, id, 0)?;
                return self.resolve_type(cx, inner);
            }
            Token::Mul => {
                let elem = self.component(cx, id, 0)?;
                elem.map(|e| self.types.new_pointer(&e))
            }
            Token::Array => {
                let elem = self.component(cx, id, 1)?;
                let len = match ast.children(id).first().copied().flatten() {
                    Some(len) => Some(self.array_len(cx, len)?),
                    None => None,
                };
                match (elem, len) {
                    (Some(e), Some(n)) => Some(self.types.new_array(&e, n).map_err(|err| self.type_diag(cx, id, err))?),
                    (Some(e), None) => Some(self.types.new_slice(&e)),
                    (None, _) => None,
                }
            }
            Token::Map => {
                let key = self.component(cx, id, 0)?;
                let elem = self.component(cx, id, 1)?;
                match (key, elem) {
                    (Some(k), Some(e)) => Some(self.types.new_map(&k, &e)),
                    _ => None,
                }
            }
            op @ (Token::BothDir | Token::SendDir | Token::RecvDir) => {
                let dir = match op {
                    Token::SendDir => ChanDir::Send,
                    Token::RecvDir => ChanDir::Recv,
                    _ => ChanDir::Both,
                };
                let elem = self.component(cx, id, 0)?;
                elem.map(|e| self.types.new_chan(&e, dir))
            }
            Token::Func => self.resolve_signature(cx, id)?,
            Token::Interface => self.resolve_interface(cx, id)?,
            Token::Period => {
                return Err(self.diag(
                    cx,
                    id,
                    format!("qualified type {} is not supported", ast.render(id)),
                ))
            }
            Token::Struct => return Err(self.diag(cx, id, "struct types are not supported")),
            Token::Index => return Err(self.diag(cx, id, "generic type instantiation is not supported")),
            _ => return Err(self.diag(cx, id, format!("{} is not a type", ast.render(id)))),
        };
        Ok(t.unwrap_or_else(|| self.types.invalid()))
    }

    /// Resolves child `index` of a composite type; `None` when it is invalid,
    /// which makes the composite invalid too.
    fn component(&mut self, cx: &Cx<'_>, id: NodeId, index: usize) -> Result<Option<Type>, ResolveError> {
        let c = self.child(cx, id, index)?;
        let t = self.resolve_type(cx, c)?;
        Ok((!is_invalid(&t)).then_some(t))
    }

    fn array_len(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<u64, ResolveError> {
        let ast = cx.ast;
        let lit = match ast.op(id) {
            Token::Int => ast.lit(id).to_string(),
            Token::Ellipsis => {
                return Err(self.diag(
                    cx,
                    id,
                    "invalid use of [...] array outside a composite literal",
                ))
            }
            Token::Ident => match self.use_ident(cx, id)? {
                Object {
                    class: ObjClass::Const,
                    value: Some(v),
                    ..
                } if v.kind.is_integer() => v.lit,
                obj => {
                    return Err(self.diag(
                        cx,
                        id,
                        format!("array length {} must be an integer constant", obj.name),
                    ))
                }
            },
            _ => {
                return Err(self.diag(
                    cx,
                    id,
                    format!("array length {} must be a constant literal", ast.render(id)),
                ))
            }
        };
        parse_int_lit(&lit).ok_or_else(|| self.diag(cx, id, format!("invalid array length {lit}")))
    }

    /// `B(FUNC, L(PARAMS), L(RESULTS))`.
    fn resolve_signature(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<Option<Type>, ResolveError> {
        let kids = cx.ast.children(id);
        let (params, variadic) = self.resolve_fields(cx, kids.first().copied().flatten(), true)?;
        let (results, _) = self.resolve_fields(cx, kids.get(1).copied().flatten(), false)?;
        if params.iter().chain(&results).any(is_invalid) {
            return Ok(None);
        }
        self.types
            .new_func(&params, &results, variadic)
            .map(Some)
            .map_err(|err| self.type_diag(cx, id, err))
    }

    /// Types of a `PARAMS`/`RESULTS` list, one per declared name. A final
    /// `...T` parameter becomes `[]T`.
    fn resolve_fields(
        &mut self,
        cx: &Cx<'_>,
        list: Option<NodeId>,
        allow_variadic: bool,
    ) -> Result<(Vec<Type>, bool), ResolveError> {
        let ast = cx.ast;
        let Some(list) = list else {
            return Ok((Vec::new(), false));
        };
        let fields: Vec<NodeId> = ast
            .children(list)
            .iter()
            .flatten()
            .copied()
            .filter(|&f| !ast.node(f).is_bad())
            .collect();
        let mut types = Vec::new();
        let mut variadic = false;
        for (i, &field) in fields.iter().enumerate() {
            let count = match ast.children(field).first().copied().flatten() {
                Some(names) => ast.len(names),
                None => 1,
            };
            let typ = self.child(cx, field, 1)?;
            let t = if ast.op(typ) == Token::Ellipsis {
                if !allow_variadic || i + 1 != fields.len() || count != 1 {
                    return Err(self.diag(cx, typ, "can only use ... with final parameter in list"));
                }
                variadic = true;
                let elem = self.child(cx, typ, 0)?;
                let elem = self.resolve_type(cx, elem)?;
                if is_invalid(&elem) {
                    elem
                } else {
                    self.types.new_slice(&elem)
                }
            } else {
                self.resolve_type(cx, typ)?
            };
            types.extend(std::iter::repeat(t).take(count));
        }
        Ok((types, variadic))
    }

    /// `L(INTERFACE, fields)`: named fields are methods, unnamed ones are
    /// embedded interfaces.
    fn resolve_interface(&mut self, cx: &Cx<'_>, id: NodeId) -> Result<Option<Type>, ResolveError> {
        let ast = cx.ast;
        let mut embedded = Vec::new();
        let mut methods = Vec::new();
        for &field in ast.children(id).iter().flatten() {
            if ast.node(field).is_bad() {
                continue;
            }
            let typ = self.child(cx, field, 1)?;
            match ast.children(field).first().copied().flatten() {
                Some(names) => {
                    let name_id = self.child(cx, names, 0)?;
                    let name = ast.lit(name_id).to_string();
                    let Some(sig) = self.resolve_signature(cx, typ)? else {
                        return Ok(None);
                    };
                    let pkg = self.method_pkg(&name);
                    methods.push(Method::new(name, pkg, sig));
                }
                None => {
                    if matches!(ast.op(typ), Token::Or | Token::Tilde) {
                        return Err(self.diag(cx, typ, "type constraints are not supported"));
                    }
                    let t = self.resolve_type(cx, typ)?;
                    if t.underlying().is_none() {
                        return Err(self.diag(cx, typ, format!("invalid recursive type {t}")));
                    }
                    if is_invalid(&t) {
                        return Ok(None);
                    }
                    if t.kind() != Kind::Interface {
                        return Err(self.diag(cx, typ, format!("{t} is not an interface")));
                    }
                    embedded.push(t);
                }
            }
        }
        self.types
            .new_interface(&embedded, &methods)
            .map(Some)
            .map_err(|err| self.type_diag(cx, id, err))
    }

    // -------------------------------------------------------------------------
    // Pass 3: methods
    // -------------------------------------------------------------------------

    /// `L(FUNC, [L(PARAMS) recv, name, signature, body·])`.
    fn declare_method(&mut self, cx: &Cx<'_>, decl: NodeId) -> Result<(), ResolveError> {
        let ast = cx.ast;
        let recv = self.child(cx, decl, 0)?;
        let name_id = self.child(cx, decl, 1)?;
        let sig_node = self.child(cx, decl, 2)?;
        if ast.op(name_id) != Token::Ident {
            return Err(self.diag(cx, name_id, "generic methods are not supported"));
        }

        let fields: Vec<NodeId> = ast.children(recv).iter().flatten().copied().collect();
        let field = match fields.as_slice() {
            [one] => *one,
            [] => return Err(self.diag(cx, recv, "method has no receiver")),
            _ => return Err(self.diag(cx, recv, "method has multiple receivers")),
        };
        let mut base = self.child(cx, field, 1)?;
        if ast.op(base) == Token::Mul {
            base = self.child(cx, base, 0)?;
        }
        if ast.op(base) != Token::Ident {
            return Err(self.diag(cx, base, format!("invalid receiver type {}", ast.render(base))));
        }
        let type_name = ast.lit(base).to_string();
        let recv_type = match self.scope.get(&type_name).copied() {
            Some(entry) if entry.class == ObjClass::Type => {
                self.objects.get(entry.name).and_then(|o| o.ty.clone())
            }
            Some(_) => None,
            None if self.universe.contains_key(type_name.as_str()) => {
                return Err(self.diag(
                    cx,
                    base,
                    format!("cannot define new methods on non-local type {type_name}"),
                ))
            }
            None => return Err(self.diag(cx, base, format!("undefined: {type_name}"))),
        };
        let Some(recv_type) = recv_type.filter(|t| t.pkg_path().is_some()) else {
            return Err(self.diag(cx, base, format!("invalid receiver type {type_name}")));
        };
        match recv_type.kind() {
            Kind::Invalid => return Ok(()),
            Kind::Ptr | Kind::Interface => {
                return Err(self.diag(
                    cx,
                    base,
                    format!("invalid receiver type {type_name} (pointer or interface type)"),
                ))
            }
            _ => {}
        }

        let Some(sig) = self.resolve_type(cx, sig_node).map(|t| (!is_invalid(&t)).then_some(t))? else {
            return Ok(());
        };
        let name = ast.lit(name_id).to_string();
        if !self.methods.insert((type_name.clone(), name.clone())) {
            return Err(self.diag(cx, name_id, format!("method {type_name}.{name} already declared")));
        }
        let pkg = self.method_pkg(&name);
        recv_type
            .add_method(Method::new(&name, pkg, sig.clone()))
            .map_err(|err| self.type_diag(cx, name_id, err))?;
        trace!(recv = %recv_type, method = %name, "method declared");
        let obj = Object {
            ty: Some(sig),
            ..Object::new(name, ObjClass::Func, Some(decl))
        };
        self.objects.insert(name_id, obj);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pass 4: completeness
    // -------------------------------------------------------------------------

    /// A named type that is still incomplete once everything is bound
    /// contains itself by value.
    fn check_complete(&mut self, cx: &Cx<'_>) {
        let mut incomplete = Vec::new();
        for entry in self.order.iter().filter(|e| e.class == ObjClass::Type) {
            let Some(obj) = self.objects.get(entry.name) else {
                continue;
            };
            if let Some(t) = &obj.ty {
                if t.underlying().is_some() && !is_invalid(t) && !t.is_complete() {
                    incomplete.push((entry.name, obj.name.clone()));
                }
            }
        }
        for (at, name) in incomplete {
            let err = self.diag(cx, at, format!("invalid recursive type {name}"));
            self.record(err);
        }
    }
}

fn live_children(ast: &Ast, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    ast.children(id)
        .iter()
        .flatten()
        .copied()
        .filter(move |&c| !ast.node(c).is_bad())
}

/// Bound to the invalid type. Named types still waiting for their
/// underlying type are not invalid.
fn is_invalid(t: &Type) -> bool {
    t.underlying().is_some() && t.kind() == Kind::Invalid
}

fn literal_kind(op: Token) -> Option<Kind> {
    match op {
        Token::Int => Some(Kind::UntypedInt),
        Token::Float => Some(Kind::UntypedFloat),
        Token::Imag => Some(Kind::UntypedComplex),
        Token::Char => Some(Kind::UntypedRune),
        Token::String => Some(Kind::UntypedString),
        _ => None,
    }
}

/// Value of a Go integer literal: decimal, `0x`, `0o`, `0b` or legacy
/// leading-zero octal, with `_` separators.
pub fn parse_int_lit(lit: &str) -> Option<u64> {
    let digits: String = lit.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(body, radix).ok()
}

fn universe(types: &TypeTable) -> FxHashMap<&'static str, Object> {
    let mut scope = FxHashMap::default();
    for kind in Kind::BASIC {
        if kind.is_untyped() || kind == Kind::UnsafePointer {
            continue;
        }
        let name = kind.name();
        scope.insert(name, Object::predeclared(name, ObjClass::Type, types.basic(kind)));
    }
    scope.insert("byte", Object::predeclared("byte", ObjClass::Type, types.basic(Kind::Uint8)));
    scope.insert("rune", Object::predeclared("rune", ObjClass::Type, types.basic(Kind::Int32)));
    // Interface constructors only fail on malformed method lists.
    if let Ok(any) = types.new_interface(&[], &[]) {
        scope.insert("any", Object::predeclared("any", ObjClass::Type, any));
    }
    if let Ok(error) = error_type(types) {
        scope.insert("error", Object::predeclared("error", ObjClass::Type, error));
    }

    let untyped_bool = types.basic(Kind::UntypedBool);
    for name in ["true", "false"] {
        let mut obj = Object::predeclared(name, ObjClass::Const, untyped_bool.clone());
        obj.value = Some(ConstValue::new(Kind::UntypedBool, name));
        scope.insert(name, obj);
    }
    scope.insert(
        "nil",
        Object::predeclared("nil", ObjClass::Var, types.basic(Kind::UntypedNil)),
    );

    for &(name, nin, nout, variadic) in BUILTINS {
        scope.insert(name, new_builtin_obj(types, name, nin, nout, variadic));
    }
    scope
}

/// `type error interface { Error() string }`
fn error_type(types: &TypeTable) -> Result<Type, TypeError> {
    let sig = types.new_func(&[], &[types.basic(Kind::String)], false)?;
    let iface = types.new_interface(&[], &[Method::new("Error", "", sig)])?;
    let error = types.new_named("", "error");
    error.set_underlying(&iface)?;
    Ok(error)
}
