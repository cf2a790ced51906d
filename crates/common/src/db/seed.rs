//! Demo documents for anonymous callers

use super::store::NewDocument;

/// Ownerless documents inserted by the seed endpoint
pub fn demo_documents() -> Vec<NewDocument> {
    vec![
        NewDocument::new(
            "Getting Started Guide",
            "# Welcome to LexForge\n\n\
             LexForge stores your legal documents and lets you ask questions about them.\n\n\
             ## Creating Documents\n\n\
             1. Open the Documents tab and choose \"Add Document\"\n\
             2. Pick a template such as a lease, NDA, or service agreement\n\
             3. Fill in the placeholders and save\n\n\
             ## Querying Documents\n\n\
             Type a question in the Query tab. The most relevant documents are selected \
             and an answer is written from their contents, citing each source.\n\n\
             ## Expiry Tracking\n\n\
             Run an expiry scan to detect the expiry date of each agreement.",
        )
        .with_template("blank"),
        NewDocument::new(
            "Residential Lease Agreement",
            "# Residential Lease Agreement\n\n\
             This lease is made between the Landlord, Harbor Properties LLC, and the Tenant, \
             Jordan Avery, for the premises at 14 Elm Street, Unit 3.\n\n\
             ## Term\n\n\
             The lease begins on 2025-03-01 and the expiry date is 2026-02-28. \
             Either party may renew by written notice 60 days before the expiry date.\n\n\
             ## Rent\n\n\
             Monthly rent is $1,850, due on the first day of each month. \
             A late fee of $75 applies after the fifth day.\n\n\
             ## Security Deposit\n\n\
             The Tenant pays a security deposit of $1,850, returned within 30 days \
             of move-out less lawful deductions.",
        )
        .with_template("lease"),
        NewDocument::new(
            "Mutual Non-Disclosure Agreement",
            "# Mutual Non-Disclosure Agreement\n\n\
             Northwind Analytics and Contoso Legal agree to protect Confidential Information \
             disclosed for the purpose of evaluating a potential partnership.\n\n\
             ## Obligations\n\n\
             - Use Confidential Information only for the stated purpose\n\
             - Restrict disclosure to employees with a need to know\n\
             - Return or destroy materials on request\n\n\
             ## Term\n\n\
             This agreement remains in force for two years from 2024-06-15 and expires \
             on 2026-06-15. Confidentiality obligations survive for three years after expiry.\n\n\
             ## Governing Law\n\n\
             This agreement is governed by the laws of the State of New York.",
        )
        .with_template("nda"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_documents_are_complete() {
        let docs = demo_documents();
        assert_eq!(docs.len(), 3);
        for doc in docs {
            assert!(!doc.name.is_empty());
            assert!(!doc.content.is_empty());
            assert_ne!(doc.template_id, "");
        }
    }
}
