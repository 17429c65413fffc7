use actix_web::{web, HttpResponse};
use log::error;

use crate::error::{AppError, AppResult};
use crate::models::{DeleteRequest, ListQuery, RenameRequest};
use crate::services::DocumentStore;

fn require_user_id(user_id: Option<&str>) -> AppResult<&str> {
    user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing userId".to_string()))
}

/// GET /documents?userId= — records for one owner, newest first.
pub async fn list_documents(
    query: web::Query<ListQuery>,
    store: web::Data<DocumentStore>,
) -> AppResult<HttpResponse> {
    let user_id = require_user_id(query.user_id.as_deref())?;

    let records = store.list_by_owner(user_id).await.map_err(|e| {
        error!("Failed to list documents: {}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// PATCH /documents/{id} — rename, only for the matching owner.
pub async fn rename_document(
    path: web::Path<String>,
    body: web::Json<RenameRequest>,
    store: web::Data<DocumentStore>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let user_id = require_user_id(body.user_id.as_deref())?;

    let updated = store.rename(&id, user_id, &body.name).await.map_err(|e| {
        error!("Failed to rename document {}: {}", id, e);
        AppError::Internal(e.to_string())
    })?;

    match updated {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AppError::NotFound("Document not found".to_string())),
    }
}

/// DELETE /documents/{id} — same ownership rule as rename.
pub async fn delete_document(
    path: web::Path<String>,
    body: web::Json<DeleteRequest>,
    store: web::Data<DocumentStore>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let user_id = require_user_id(body.user_id.as_deref())?;

    let deleted = store.delete(&id, user_id).await.map_err(|e| {
        error!("Failed to delete document {}: {}", id, e);
        AppError::Internal(e.to_string())
    })?;

    if deleted {
        Ok(HttpResponse::Ok().finish())
    } else {
        Err(AppError::NotFound("Document not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentRecord;
    use actix_web::{test, App};
    use uuid::Uuid;

    async fn temp_store() -> (DocumentStore, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("docuscan_docs_{}.db", Uuid::new_v4()));
        let _ = std::fs::File::create(&path);
        let store = DocumentStore::new(&format!("sqlite:{}", path.to_str().unwrap()))
            .await
            .expect("store init");
        (store, path)
    }

    macro_rules! docs_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($store.clone()))
                    .route("/documents", web::get().to(list_documents))
                    .route("/documents/{id}", web::patch().to(rename_document))
                    .route("/documents/{id}", web::delete().to(delete_document)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn listing_requires_user_id() {
        let (store, path) = temp_store().await;
        let app = docs_app!(store);

        let resp = test::TestRequest::get()
            .uri("/documents")
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 401);

        let _ = std::fs::remove_file(&path);
    }

    #[actix_web::test]
    async fn rename_for_wrong_owner_is_not_found() {
        let (store, path) = temp_store().await;
        let record = store
            .create("u1", "doc", "http://x/a.docx", None)
            .await
            .expect("create");
        let app = docs_app!(store);

        let resp = test::TestRequest::patch()
            .uri(&format!("/documents/{}", record.id))
            .set_json(serde_json::json!({ "userId": "u2", "name": "hijack" }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 404);

        let resp = test::TestRequest::patch()
            .uri(&format!("/documents/{}", record.id))
            .set_json(serde_json::json!({ "userId": "u1", "name": "renamed" }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
        let updated: DocumentRecord = test::read_body_json(resp).await;
        assert_eq!(updated.name, "renamed");

        let _ = std::fs::remove_file(&path);
    }

    #[actix_web::test]
    async fn delete_for_wrong_owner_keeps_the_record_listed() {
        let (store, path) = temp_store().await;
        let record = store
            .create("u1", "doc", "http://x/a.docx", None)
            .await
            .expect("create");
        let app = docs_app!(store);

        let resp = test::TestRequest::delete()
            .uri(&format!("/documents/{}", record.id))
            .set_json(serde_json::json!({ "userId": "u2" }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 404);

        let resp = test::TestRequest::get()
            .uri("/documents?userId=u1")
            .send_request(&app)
            .await;
        let listed: Vec<DocumentRecord> = test::read_body_json(resp).await;
        assert_eq!(listed.len(), 1, "record must survive a foreign delete");

        let resp = test::TestRequest::delete()
            .uri(&format!("/documents/{}", record.id))
            .set_json(serde_json::json!({ "userId": "u1" }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);

        let _ = std::fs::remove_file(&path);
    }
}
