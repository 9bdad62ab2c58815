// file ::= import* decl*
// import ::= '@import' STRING [';']
// decl ::= IDENT '=' typedef
// typedef ::= record | interface | enum
// record ::= 'record' ext '{' (const | field)* '}'
// field ::= IDENT ':' type ';'
// const ::= 'const' IDENT ':' IDENT '=' (INT | FLOAT | STRING | '{' ... '}') ';'
// type ::= 'map' '<' IDENT ',' IDENT '>'
//        | ('optional' | 'list' | 'set') '<' type '>'
//        | IDENT
// interface ::= 'interface' ext '{' ... '}'
// enum ::= ('enum' | 'flags') '{' (IDENT ';')* '}'
// ext ::= ('+c' | '+o' | '+j')*

use serde::Serialize;

/// The root of a parsed Djinni file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IdlFile {
    /// Import paths, unquoted, in source order. They are never resolved.
    pub imports: Vec<String>,
    pub type_decls: Vec<TypeDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub ident: Ident,
    pub body: TypeDef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    Record(Record),
    Interface(Interface),
    /// Both `enum` and `flags`; see [`Enum::flags`].
    Enum(Enum),
}

/// Which native bindings a declaration requests (`+c`, `+o`, `+j`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Ext {
    pub cpp: bool,
    pub objc: bool,
    pub java: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub ext: Ext,
    pub fields: Vec<Field>,
    pub consts: Vec<Const>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<CommentGroup>,
    pub ident: Ident,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Const {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<CommentGroup>,
    pub ident: Ident,
    /// Always a non-generic type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub value: ConstValue,
}

/// Constant values, kept as they were written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstValue {
    Int(String),
    Float(String),
    /// Content between the quotes, verbatim.
    String(String),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub ext: Ext,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Enum {
    pub options: Vec<EnumOption>,
    pub flags: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<CommentGroup>,
    pub ident: Ident,
}

/// A type reference, e.g. `i32`, `optional<string>` or `map<string, i32>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeExpr {
    pub ident: Ident,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    pub fn simple(name: impl Into<String>) -> TypeExpr {
        TypeExpr {
            ident: Ident::new(name),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr {
            ident: Ident::new(name),
            args,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ident)?;
        if let Some((first, rest)) = self.args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Ident {
        Ident { name: name.into() }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reserved for documentation comments. The parser never fills it in yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommentGroup {
    pub comments: Vec<String>,
}
