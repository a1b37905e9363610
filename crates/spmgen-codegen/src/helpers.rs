//! Built-in template helpers.
//!
//! Callers may pass their own helpers in a [`HelperMap`]; they are
//! registered after the built-ins and replace any of the same name.

use std::collections::BTreeMap;
use std::path::Path;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
};
use spmgen_core::{CodeTable, PERMISSION_TABLE, PRIORITY_TABLE};

/// Named template helpers supplied by the caller.
pub type HelperMap = BTreeMap<String, Box<dyn HelperDef + Send + Sync>>;

/// Names of the helpers every registry starts with.
pub const BUILTIN_HELPERS: [&str; 3] = ["basename", "find_priority_key", "find_permission_key"];

pub(crate) fn register_builtins(registry: &mut Handlebars<'_>) {
    registry.register_helper("basename", Box::new(basename_helper));
    registry.register_helper("find_priority_key", Box::new(find_priority_key_helper));
    registry.register_helper("find_permission_key", Box::new(find_permission_key_helper));
}

/// `{{basename path}}`: final path component.
fn basename_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    let name = Path::new(param)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    out.write(&name)?;
    Ok(())
}

/// `{{find_priority_key code}}`: `40` becomes `HIGH`.
fn find_priority_key_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    write_key(&PRIORITY_TABLE, h, out)
}

/// `{{find_permission_key code}}`: `1` becomes `READ-ONLY`.
fn find_permission_key_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    write_key(&PERMISSION_TABLE, h, out)
}

fn write_key(table: &CodeTable, h: &Helper, out: &mut dyn Output) -> HelperResult {
    let param = h.param(0).map(|v| v.value().clone()).unwrap_or_default();
    let key = param
        .as_u64()
        .and_then(|code| u32::try_from(code).ok())
        .and_then(|code| table.key_of(code))
        .ok_or_else(|| RenderErrorReason::Other(format!("no {} key for code {param}", table.name())))?;
    out.write(key)?;
    Ok(())
}
