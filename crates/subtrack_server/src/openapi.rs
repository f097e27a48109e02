//! OpenAPI description of the HTTP surface.

use serde_json::{json, Value};
use subtrack_core::core_version;

/// Builds the OpenAPI 3 document served at `/openapi.json`.
pub fn api_document() -> Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });
    let user_param = query_param("user_id", "Exact user id match", Some("uuid"));
    let service_param = query_param(
        "service_name",
        "Case-insensitive substring of the service name",
        None,
    );
    let record = json!({ "$ref": "#/components/schemas/Subscription" });
    let error = json!({
        "description": "Error",
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Subscription Service API",
            "description": "CRUD and price summaries for user subscriptions.",
            "version": core_version()
        },
        "paths": {
            "/subscriptions": {
                "get": {
                    "summary": "List subscriptions",
                    "parameters": [user_param, service_param],
                    "responses": {
                        "200": json_response(
                            "Matching subscriptions",
                            &json!({ "type": "array", "items": record }),
                        ),
                        "500": error
                    }
                },
                "post": {
                    "summary": "Create a subscription; id is generated when omitted",
                    "requestBody": { "required": true, "content": { "application/json": { "schema": record } } },
                    "responses": {
                        "201": json_response("Created subscription", &record),
                        "400": error,
                        "500": error
                    }
                }
            },
            "/subscriptions/{id}": {
                "get": {
                    "summary": "Get a subscription",
                    "parameters": [id_param],
                    "responses": {
                        "200": json_response("Subscription", &record),
                        "404": error
                    }
                },
                "put": {
                    "summary": "Replace every mutable field of a subscription",
                    "parameters": [id_param],
                    "requestBody": { "required": true, "content": { "application/json": { "schema": record } } },
                    "responses": {
                        "200": json_response("Updated subscription", &record),
                        "400": error,
                        "404": error,
                        "500": error
                    }
                },
                "delete": {
                    "summary": "Delete a subscription",
                    "parameters": [id_param],
                    "responses": {
                        "200": json_response("Deleted", &json!({
                            "type": "object",
                            "properties": { "status": { "type": "string", "example": "deleted" } }
                        })),
                        "500": error
                    }
                }
            },
            "/subscriptions/summary": {
                "get": {
                    "summary": "Total price of matching subscriptions",
                    "parameters": [
                        user_param,
                        service_param,
                        query_param("start_date", "Earliest start month, YYYY-MM", None),
                        query_param("end_date", "Latest end month, YYYY-MM", None)
                    ],
                    "responses": {
                        "200": json_response("Price total", &json!({
                            "type": "object",
                            "properties": { "total": { "type": "integer" } }
                        })),
                        "500": error
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": {
                        "200": { "description": "Service and database are up" },
                        "503": { "description": "Database handle is unavailable" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Subscription": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "service_name": { "type": "string" },
                        "price": { "type": "integer" },
                        "user_id": { "type": "string", "format": "uuid" },
                        "start_date": { "type": "string", "format": "date-time" },
                        "end_date": { "type": "string", "format": "date-time", "nullable": true }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

fn query_param(name: &str, description: &str, format: Option<&str>) -> Value {
    let mut schema = json!({ "type": "string" });
    if let Some(format) = format {
        schema["format"] = json!(format);
    }
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": schema
    })
}

fn json_response(description: &str, schema: &Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}
