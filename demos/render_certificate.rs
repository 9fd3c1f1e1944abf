use std::fs;
use std::path::PathBuf;

use labcert::model::{
    Approval, ApproverUser, CorrectionFactorMachine, Laboratory, Receipt, RegisterEntry,
    RegisterStatus, SampleTestResult,
};
use labcert::{CertificateBundle, CertificateMapper, SpecimenShape};

fn main() {
    println!("Running example: render_certificate");

    let out_dir = PathBuf::from("demos/output");
    fs::create_dir_all(&out_dir).expect("create demos/output dir");

    let bundle = CertificateBundle {
        laboratory: Laboratory {
            name: Some("Acme Materials Testing Laboratory".into()),
            address: Some("12 Quarry Road".into()),
            email: Some("lab@acme-materials.test".into()),
            ..Default::default()
        },
        receipt: Receipt {
            receipt_no: Some("RCP-0042".into()),
            client_name: Some("Kgale Construction".into()),
            project_name: Some("Block 7 Paving".into()),
            date_received: Some("2026-09-01".into()),
            ..Default::default()
        },
        entry: RegisterEntry {
            id: "reg-42".into(),
            shape: SpecimenShape::Paver,
            status: RegisterStatus::PendingFinalApproval,
            certificate_no: Some("PV-2026-0042".into()),
            date_of_issue: Some("2026-09-30".into()),
            date_of_casting: Some("2026-09-01".into()),
            date_of_testing: Some("2026-09-29".into()),
            product_class: Some("Zigzag 80mm".into()),
            results: vec![
                SampleTestResult::new("P1")
                    .with_paver_geometry(80.0, 22500.0)
                    .with_weight(4.2)
                    .with_load(812.0),
                SampleTestResult::new("P2")
                    .with_paver_geometry(79.5, 22400.0)
                    .with_weight(4.15)
                    .with_load(798.0)
                    .with_mode_of_failure("Splitting"),
            ],
            engineer_approval: Some(Approval {
                approver_name: Some("K. Dintwe".into()),
                approved_at: Some("2026-09-29".into()),
                ..Default::default()
            }),
            ..Default::default()
        },
        machine: Some(CorrectionFactorMachine {
            id: "m-1".into(),
            name: "Compression machine".into(),
            tag_id: "CM-01".into(),
            factor_m: Some(0.98),
            factor_c: Some(1.5),
        }),
        engineer: None,
        manager: Some(ApproverUser {
            email: Some("manager@acme-materials.test".into()),
            ..Default::default()
        }),
    };

    let data = CertificateMapper::new()
        .map(bundle.sources())
        .expect("map certificate");
    println!(
        "{}: average strength {} N/mm2",
        data.sample_description, data.average_compressive_strength
    );

    let html = labcert::export::preview(&data).expect("populate template");
    let html_path = out_dir.join("certificate.html");
    fs::write(&html_path, &html).expect("write html");
    println!("Wrote {}", html_path.display());

    #[cfg(feature = "pdf")]
    {
        let renderer = labcert::PdfRenderer::global().expect("renderer config");
        match renderer.render_pdf(&data) {
            Ok(pdf) => {
                let pdf_path = out_dir.join("certificate.pdf");
                fs::write(&pdf_path, &pdf).expect("write pdf");
                println!("Wrote {} ({} bytes)", pdf_path.display(), pdf.len());
            }
            Err(e) => println!("PDF export skipped: {}", e),
        }
        renderer.close().expect("close browser");
    }
}
