use serde::Serialize;

/// Minimal FHIR OperationOutcome representation for reporting rejected payloads
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OperationOutcome {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str, // always "OperationOutcome"
    pub issue: Vec<OperationOutcomeIssue>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OperationOutcomeIssue {
    /// FHIR issue severity: fatal | error | warning | information
    pub severity: &'static str,
    /// FHIR issue type code: invalid | structure | not-supported | required
    pub code: &'static str,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    /// FHIRPath locations of the offending elements
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub expression: Vec<String>,
}

impl OperationOutcome {
    pub fn single(
        severity: &'static str,
        code: &'static str,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: "OperationOutcome",
            issue: vec![OperationOutcomeIssue {
                severity,
                code,
                diagnostics: Some(diagnostics.into()),
                expression: Vec::new(),
            }],
        }
    }

    /// Attach a FHIRPath expression to every issue.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        for issue in &mut self.issue {
            issue.expression.push(expression.clone());
        }
        self
    }
}
