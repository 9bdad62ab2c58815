use std::io::Write;

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub fn print_file_string(file: &IdlFile) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_file(&mut buf, file).expect("writing into a Vec can't fail");
    String::from_utf8(buf).expect("tree output is built from UTF-8 strings")
}

pub fn print_file(w: &mut impl Write, file: &IdlFile) -> std::io::Result<()> {
    for import in &file.imports {
        writeln!(w, "import {import:?}")?;
    }
    for decl in &file.type_decls {
        print_decl(w, 0, decl)?;
    }
    Ok(())
}

fn print_decl(w: &mut impl Write, i: usize, decl: &TypeDecl) -> std::io::Result<()> {
    sp(w, i)?;
    let name = &decl.ident;
    match &decl.body {
        TypeDef::Record(record) => {
            write!(w, "record {name}")?;
            print_ext(w, record.ext)?;
            writeln!(w)?;
            for field in &record.fields {
                sp(w, i + 1)?;
                writeln!(w, "field {}: {}", field.ident, field.ty)?;
            }
            for constant in &record.consts {
                print_const(w, i + 1, constant)?;
            }
        }
        TypeDef::Interface(interface) => {
            write!(w, "interface {name}")?;
            print_ext(w, interface.ext)?;
            writeln!(w)?;
        }
        TypeDef::Enum(e) => {
            let keyword = if e.flags { "flags" } else { "enum" };
            writeln!(w, "{keyword} {name}")?;
            for option in &e.options {
                sp(w, i + 1)?;
                writeln!(w, "option {}", option.ident)?;
            }
        }
    }
    Ok(())
}

fn print_ext(w: &mut impl Write, ext: Ext) -> std::io::Result<()> {
    for (enabled, marker) in [(ext.cpp, "+c"), (ext.objc, "+o"), (ext.java, "+j")] {
        if enabled {
            write!(w, " {marker}")?;
        }
    }
    Ok(())
}

fn print_const(w: &mut impl Write, i: usize, constant: &Const) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "const {}: {} = ", constant.ident, constant.ty)?;
    match &constant.value {
        ConstValue::Int(text) => writeln!(w, "int {text}"),
        ConstValue::Float(text) => writeln!(w, "float {text}"),
        ConstValue::String(text) => writeln!(w, "string {text:?}"),
    }
}
