//! Operation: describe the target interpreter.

use pipette_core::environment::Interpreter;
use pipette_util::errors::PipetteError;

use crate::context::Context;

/// `(key, value)` rows describing the interpreter and its marker values.
pub fn describe(ctx: &Context) -> Result<Vec<(&'static str, String)>, PipetteError> {
    let interpreter = ctx.interpreter()?;
    let markers = &interpreter.markers;
    let mut rows = vec![
        ("executable", interpreter.executable.display().to_string()),
        ("site-packages", ctx.site_packages().display().to_string()),
        ("python_version", markers.python_version.clone()),
        ("python_full_version", markers.python_full_version.clone()),
        ("sys_platform", markers.sys_platform.clone()),
        ("platform_system", markers.platform_system.clone()),
        ("platform_machine", markers.platform_machine.clone()),
        ("os_name", markers.os_name.clone()),
        ("implementation_name", markers.implementation_name.clone()),
        (
            "platform_python_implementation",
            markers.platform_python_implementation.clone(),
        ),
    ];
    if let Some(glibc) = &interpreter.glibc_version {
        rows.push(("glibc", glibc.clone()));
    }
    if let Some(macos) = &interpreter.macos_version {
        rows.push(("macos", macos.clone()));
    }
    Ok(rows)
}

/// The interpreter description as pretty JSON.
pub fn to_json(interpreter: &Interpreter) -> Result<String, PipetteError> {
    serde_json::to_string_pretty(interpreter).map_err(|e| PipetteError::Generic {
        message: format!("Failed to serialize environment: {e}"),
    })
}
