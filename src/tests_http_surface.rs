#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::server::{create_router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const DEFAULT_ROSTER: &str = "\
Roll No.,Name of the student,B.Tech./M. Tech./MCA,Name of organization,Package p.a. (Lakhs),On campus,Off campus \n\
12345.0,Sarvesh Ravi,B.Tech.,Acme Corp,12.5,Yes,\n\
20002,Ravi Kumar,M. Tech.,Globex,abc,,Yes\n\
20003,Ravi,B.Tech.,Acme Corp,8,Yes,\n";

    fn app(dir: &TempDir) -> Router {
        fs::write(dir.path().join("seniors_data_cleaned.csv"), DEFAULT_ROSTER).unwrap();
        fs::write(
            dir.path().join("seniors_data_2021-2024.json"),
            r#"[{"Roll No.": 30001.0, "Name of the student": "Meera", "B.Tech./M. Tech./MCA": "MCA"}]"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.data.data_dir = dir.path().to_path_buf();
        config.web_search.api_key = None;
        create_router(AppState::new(config).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn names(body: &Value) -> Vec<&str> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Name of the student"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn seniors_without_filters_returns_all() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/seniors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(names(&body), vec!["Sarvesh Ravi", "Ravi Kumar", "Ravi"]);
        assert_eq!(body["results"][0]["Roll No."], "12345");
        assert_eq!(body["results"][0]["Off campus "], Value::Null);
    }

    #[tokio::test]
    async fn seniors_filters_from_query_string() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(
            app(&dir),
            "/seniors?degree=b.tech.&campus_type=On%20campus&min_package=10&org=&q=",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(names(&body), vec!["Sarvesh Ravi"]);
    }

    #[tokio::test]
    async fn seniors_selects_dataset_by_academic_year() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/seniors?academic_year=2021-2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Meera"]);
        assert_eq!(body["results"][0]["Roll No."], "30001");
    }

    #[tokio::test]
    async fn unknown_academic_year_is_404() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/seniors?academic_year=9999-9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "dataset_not_found");
    }

    #[tokio::test]
    async fn invalid_campus_type_is_400() {
        let dir = TempDir::new().unwrap();
        let (status, _) = get(app(&dir), "/seniors?campus_type=Hybrid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn senior_lookup_hit_and_miss() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/seniors/12345").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Name of the student"], "Sarvesh Ravi");

        let (status, body) = get(app(&dir), "/seniors/00000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "not found" }));
    }

    #[tokio::test]
    async fn search_ranks_and_validates() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/search?name=RAVI&limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "RAVI");
        assert_eq!(body["total"], 3);
        assert_eq!(names(&body), vec!["Ravi", "Ravi Kumar"]);

        let (status, body) = get(app(&dir), "/search?name=a").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");
    }

    #[tokio::test]
    async fn filters_lists_programs_and_constants() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/filters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degree"], json!(["B.Tech.", "M. Tech."]));
        assert_eq!(body["campus_type"], json!(["On campus", "Off campus"]));
        assert_eq!(body["academic_year"], json!(["2020-2023", "2021-2024", "2022-2025"]));
    }

    #[tokio::test]
    async fn health_reports_loaded_datasets() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["datasets"], json!([]));
    }

    #[tokio::test]
    async fn reload_swaps_dataset_and_shows_in_health() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (_, body) = get(app.clone(), "/seniors").await;
        assert_eq!(body["total"], 3);

        fs::write(
            dir.path().join("seniors_data_cleaned.csv"),
            "Roll No.,Name of the student\n1,Asha\n",
        )
        .unwrap();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = get(app.clone(), "/seniors").await;
        assert_eq!(names(&body), vec!["Asha"]);

        let (_, body) = get(app, "/health").await;
        assert_eq!(body["datasets"][0]["key"], "default");
        assert_eq!(body["datasets"][0]["records"], 1);
        assert_eq!(body["datasets"][0]["columns"], json!(["Roll No.", "Name of the student"]));
    }

    #[tokio::test]
    async fn reload_of_unknown_year_is_404() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reload?academic_year=1999-2002")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn linkedin_search_without_key_is_500() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/proxy/linkedin-search")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name": "Ravi", "org": "Acme Corp"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
