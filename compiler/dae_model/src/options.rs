//! Compiler options recognized by the simplification pipeline.

/// Error loading options from a flag map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("unknown compiler option `{0}`")]
    Unknown(String),
}

/// Which simplification passes run, and their limits.
///
/// Every pass is off by default, so the default options leave a model
/// untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Expand vector variables into scalar element variables first.
    pub expand_vectors: bool,
    /// Collapse `a = ±b` equations into a single representative.
    pub detect_aliases: bool,
    /// Fold affine equations into one `A·x + b = 0` block.
    pub reduce_affine_expression: bool,
    /// Substitute constants defined by expressions over other constants.
    pub replace_constant_expressions: bool,
    /// Substitute constants with literal values.
    pub replace_constant_values: bool,
    /// Substitute parameters defined by expressions.
    pub replace_parameter_expressions: bool,
    /// Substitute parameters with literal values.
    pub replace_parameter_values: bool,
    /// Upper bound on alias/affine fixed-point iterations. `None` uses the
    /// number of algebraic slots plus one.
    pub max_reduction_iterations: Option<usize>,
}

impl CompilerOptions {
    /// Every pass enabled.
    pub fn all() -> Self {
        Self {
            expand_vectors: true,
            detect_aliases: true,
            reduce_affine_expression: true,
            replace_constant_expressions: true,
            replace_constant_values: true,
            replace_parameter_expressions: true,
            replace_parameter_values: true,
            max_reduction_iterations: None,
        }
    }

    /// Build options from `(name, enabled)` pairs, starting from the defaults.
    pub fn from_flags<'a>(
        flags: impl IntoIterator<Item = (&'a str, bool)>,
    ) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        for (name, enabled) in flags {
            options.set(name, enabled)?;
        }
        Ok(options)
    }

    /// Set one boolean option by name.
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<(), OptionsError> {
        let field = match name {
            "expand_vectors" => &mut self.expand_vectors,
            "detect_aliases" => &mut self.detect_aliases,
            "reduce_affine_expression" => &mut self.reduce_affine_expression,
            "replace_constant_expressions" => &mut self.replace_constant_expressions,
            "replace_constant_values" => &mut self.replace_constant_values,
            "replace_parameter_expressions" => &mut self.replace_parameter_expressions,
            "replace_parameter_values" => &mut self.replace_parameter_values,
            _ => return Err(OptionsError::Unknown(name.to_owned())),
        };
        *field = enabled;
        Ok(())
    }

    /// Any pass that rewrites the equation set is enabled.
    pub fn any_enabled(&self) -> bool {
        self.expand_vectors
            || self.detect_aliases
            || self.reduce_affine_expression
            || self.replace_constant_expressions
            || self.replace_constant_values
            || self.replace_parameter_expressions
            || self.replace_parameter_values
    }
}

#[cfg(test)]
mod tests;
