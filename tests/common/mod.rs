#![allow(dead_code)]

use contract_guardian::{
    engine::{Engine, ExtractionRequest},
    error::EngineError,
    schema::{ContractAnalysis, KeyDate, RiskClause},
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::cell::{Cell, RefCell};
use std::path::Path;

/// Write a PDF with one line of text per page.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

pub const CONTRACT_TEXT: &str = "This Agreement renews automatically for successive one-year terms \
unless either party gives notice 30 days before the anniversary date. \
In no event shall Provider's liability exceed the fees paid in the prior month.";

pub fn sample_analysis() -> ContractAnalysis {
    ContractAnalysis {
        contract_type: "SaaS Agreement".into(),
        fairness_score: 41,
        high_risk_clauses: vec![
            RiskClause {
                clause_name: "Automatic Renewal".into(),
                risk_level: "High".into(),
                summary: "Renews unless cancelled 30 days ahead.".into(),
                original_text: "This Agreement renews automatically for successive one-year terms"
                    .into(),
            },
            RiskClause {
                clause_name: "Limitation of Liability".into(),
                risk_level: "Medium".into(),
                summary: "Liability capped at one month of fees.".into(),
                original_text:
                    "In no event shall Provider's liability exceed the fees paid in the prior month."
                        .into(),
            },
        ],
        key_dates: vec![KeyDate {
            event: "Termination Notice Deadline".into(),
            date_description: "30 days before the anniversary date".into(),
            risk_summary: Some("Missing it locks in another year.".into()),
        }],
        overall_summary: "Vendor-favourable subscription terms.".into(),
    }
}

pub enum Behavior {
    Return(ContractAnalysis),
    Fault(String),
    Api { status: u16, body: String },
}

/// Engine double that records every call.
pub struct MockEngine {
    behavior: Behavior,
    pub calls: Cell<usize>,
    pub last_text: RefCell<Option<String>>,
    pub last_api_key: RefCell<Option<String>>,
    pub last_model: RefCell<Option<String>>,
    pub last_task: RefCell<Option<String>>,
    pub last_fence: Cell<Option<bool>>,
}

impl MockEngine {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Cell::new(0),
            last_text: RefCell::new(None),
            last_api_key: RefCell::new(None),
            last_model: RefCell::new(None),
            last_task: RefCell::new(None),
            last_fence: Cell::new(None),
        }
    }

    pub fn returning(analysis: ContractAnalysis) -> Self {
        Self::new(Behavior::Return(analysis))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Behavior::Fault(message.into()))
    }
}

impl Engine for MockEngine {
    fn extract(&self, req: &ExtractionRequest<'_>) -> Result<ContractAnalysis, EngineError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_text.borrow_mut() = Some(req.text.to_string());
        *self.last_api_key.borrow_mut() = Some(req.api_key.to_string());
        *self.last_model.borrow_mut() = Some(req.model_id.to_string());
        *self.last_task.borrow_mut() = Some(req.task_description.to_string());
        self.last_fence.set(Some(req.fence_output));
        match &self.behavior {
            Behavior::Return(a) => Ok(a.clone()),
            Behavior::Fault(msg) => Err(EngineError::Fault(msg.clone())),
            Behavior::Api { status, body } => Err(EngineError::Api {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
