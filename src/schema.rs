use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskClause {
    /// e.g. "Automatic Renewal", "Limitation of Liability".
    pub clause_name: String,
    /// Low, Medium or High. Not enforced.
    pub risk_level: String,
    pub summary: String,
    /// Verbatim excerpt of the contract text.
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDate {
    pub event: String,
    /// The date or the formula for computing it, e.g. "30 days before anniversary".
    pub date_description: String,
    #[serde(default)]
    pub risk_summary: Option<String>,
}

/// Structured risk assessment of one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    pub contract_type: String,
    /// 1-100, how fair the contract is to the signing party. Not enforced.
    pub fairness_score: i64,
    #[serde(default)]
    pub high_risk_clauses: Vec<RiskClause>,
    #[serde(default)]
    pub key_dates: Vec<KeyDate>,
    pub overall_summary: String,
}

impl ContractAnalysis {
    /// Response schema handed to the extraction engine.
    pub fn response_schema() -> Value {
        let risk_clause = json!({
            "type": "OBJECT",
            "properties": {
                "clause_name": {
                    "type": "STRING",
                    "description": "The name of the clause (e.g., 'Automatic Renewal', 'Limitation of Liability')"
                },
                "risk_level": {
                    "type": "STRING",
                    "enum": ["Low", "Medium", "High"],
                    "description": "Risk level: Low, Medium, High"
                },
                "summary": {
                    "type": "STRING",
                    "description": "A brief explanation of why this clause is risky for the user"
                },
                "original_text": {
                    "type": "STRING",
                    "description": "The exact text from the contract, copied verbatim"
                }
            },
            "required": ["clause_name", "risk_level", "summary", "original_text"]
        });

        let key_date = json!({
            "type": "OBJECT",
            "properties": {
                "event": {
                    "type": "STRING",
                    "description": "The event the date refers to (e.g., 'Termination Notice Deadline', 'Contract End Date')"
                },
                "date_description": {
                    "type": "STRING",
                    "description": "The date or formula for calculating it (e.g., '30 days before anniversary')"
                },
                "risk_summary": {
                    "type": "STRING",
                    "nullable": true,
                    "description": "Any specific risk associated with this date"
                }
            },
            "required": ["event", "date_description"]
        });

        json!({
            "type": "OBJECT",
            "properties": {
                "contract_type": {
                    "type": "STRING",
                    "description": "The type of contract (e.g., NDA, SaaS Agreement, Lease)"
                },
                "fairness_score": {
                    "type": "INTEGER",
                    "description": "A score from 1-100 representing how fair the contract is to the user (signing party)"
                },
                "high_risk_clauses": {
                    "type": "ARRAY",
                    "items": risk_clause,
                    "description": "A list of identified high-risk clauses"
                },
                "key_dates": {
                    "type": "ARRAY",
                    "items": key_date,
                    "description": "A list of important dates extracted from the contract"
                },
                "overall_summary": {
                    "type": "STRING",
                    "description": "A high-level human-readable summary of the contract's impact"
                }
            },
            "required": [
                "contract_type",
                "fairness_score",
                "high_risk_clauses",
                "key_dates",
                "overall_summary"
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_field() {
        let schema = ContractAnalysis::response_schema();
        let props = schema["properties"].as_object().unwrap();
        for field in [
            "contract_type",
            "fairness_score",
            "high_risk_clauses",
            "key_dates",
            "overall_summary",
        ] {
            assert!(props.contains_key(field), "missing {field}");
        }
        assert_eq!(
            schema["properties"]["high_risk_clauses"]["items"]["required"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
    }

    #[test]
    fn risk_summary_is_optional() {
        let raw = r#"{"event":"Renewal","date_description":"Every 12 months"}"#;
        let d: KeyDate = serde_json::from_str(raw).unwrap();
        assert!(d.risk_summary.is_none());
    }
}
