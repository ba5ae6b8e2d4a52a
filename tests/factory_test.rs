//! 服务工厂测试

use micro_registry::service::{
    DescribeService, FieldDescriptor, ListenPort, Message, MessageDescriptor, MethodDescriptor,
    RouteTable, RpcServiceTable, ServerKind, ServiceClass,
};
use micro_registry::{ErrorCode, Service, ServiceFactory};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;

const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

fn factory() -> ServiceFactory {
    ServiceFactory::new().with_host(HOST)
}

// ---- HTTP ----

struct HttpServer {
    port: u16,
    routes: Mutex<Vec<String>>,
}

impl HttpServer {
    fn new(port: u16, routes: &[&str]) -> Self {
        Self {
            port,
            routes: Mutex::new(routes.iter().map(|r| r.to_string()).collect()),
        }
    }
}

impl ListenPort for HttpServer {
    fn port(&self) -> u16 {
        self.port
    }
}

impl RouteTable for HttpServer {
    fn services(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

struct Router(Vec<String>);

impl RouteTable for Router {
    fn services(&self) -> Vec<String> {
        self.0.clone()
    }
}

// ---- RPC ----

struct RpcServer {
    port: u16,
    services: Vec<(String, Vec<ServiceClass>)>,
}

impl ListenPort for RpcServer {
    fn port(&self) -> u16 {
        self.port
    }
}

impl RpcServiceTable for RpcServer {
    fn services(&self) -> Vec<(String, Vec<ServiceClass>)> {
        self.services.clone()
    }
}

struct HelloRequest;
struct HelloResponse;

impl Message for HelloRequest {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("php.micro.grpc.greeter.Request")
            .with_field(FieldDescriptor::new("name", "string"))
    }
}

impl Message for HelloResponse {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("php.micro.grpc.greeter.Response").with_field(
            FieldDescriptor::new("meta", "php.micro.grpc.greeter.Meta")
                .with_field(FieldDescriptor::new("trace_id", "string")),
        )
    }
}

struct Say;

impl DescribeService for Say {
    const NAME: &'static str = "php.micro.grpc.greeter.Say";

    fn methods() -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::unary::<HelloRequest, HelloResponse>("Hello"),
            MethodDescriptor::new("_internal"),
        ]
    }
}

struct Calculator;

impl DescribeService for Calculator {
    const NAME: &'static str = "php.micro.jsonrpc.calculator.Calculator";

    fn methods() -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("Get"),
            MethodDescriptor::new("Sum"),
            MethodDescriptor::new("_internal"),
        ]
    }
}

struct Anonymous;

impl DescribeService for Anonymous {
    const NAME: &'static str = "";

    fn methods() -> Vec<MethodDescriptor> {
        vec![MethodDescriptor::new("Get")]
    }
}

fn metadata(service: &Service) -> &BTreeMap<String, String> {
    assert_eq!(service.nodes.len(), 1);
    &service.nodes[0].metadata
}

fn expected_metadata(protocol: &str, transport: &str) -> BTreeMap<String, String> {
    [
        ("registry", "etcd"),
        ("protocol", protocol),
        ("server", protocol),
        ("transport", transport),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_api_services_from_server_routes() {
    let server = HttpServer::new(9501, &["user", "order"]);
    let services = factory()
        .create_services_from_api(&server, None, "php.micro.api", Some("v1"))
        .unwrap();

    let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["php.micro.api.user", "php.micro.api.order"]);

    for service in &services {
        assert_eq!(service.version.as_deref(), Some("v1"));
        assert!(service.endpoints.is_empty());
        assert_eq!(service.nodes[0].address, "10.0.0.5:9501");
        assert_eq!(metadata(service), &expected_metadata("json", "http"));
    }
    assert!(services[0].nodes[0].id.starts_with("user-"));
}

#[test]
fn test_router_takes_precedence() {
    let server = HttpServer::new(9502, &["ignored"]);
    let router = Router(vec!["auth".to_string()]);
    let services = factory()
        .create_services_from_web(&server, Some(&router as &dyn RouteTable), "php.micro.web", None)
        .unwrap();

    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "php.micro.web.auth");
    assert_eq!(services[0].version, None);
    assert_eq!(metadata(&services[0]), &expected_metadata("html", "http"));
}

#[test]
fn test_routes_are_read_at_call_time() {
    let server = HttpServer::new(9501, &["user"]);
    let factory = factory();
    assert_eq!(
        factory
            .create_services_from_api(&server, None, "api", None)
            .unwrap()
            .len(),
        1
    );

    server.routes.lock().unwrap().push("file".to_string());
    let services = factory
        .create_services_from_api(&server, None, "api", None)
        .unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[1].name, "api.file");
}

#[test]
fn test_http_rejects_rpc_kind() {
    let server = HttpServer::new(9501, &["user"]);
    let err = factory()
        .create_services_from_http(ServerKind::Grpc, &server, None, "api", None)
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_grpc_services_carry_typed_endpoints() {
    let server = RpcServer {
        port: 9595,
        services: vec![("php.micro.grpc.greeter".to_string(), vec![Say::class()])],
    };
    let services = factory()
        .create_services_from_grpc(&server, Some("latest"))
        .unwrap();

    assert_eq!(services.len(), 1);
    let service = &services[0];
    assert_eq!(service.name, "php.micro.grpc.greeter");
    assert_eq!(metadata(service), &expected_metadata("grpc", "http"));
    assert_eq!(service.nodes[0].address, "10.0.0.5:9595");

    assert_eq!(service.endpoints.len(), 1);
    let endpoint = &service.endpoints[0];
    assert_eq!(endpoint.name, "Say.Hello");

    let request = endpoint.request.as_ref().unwrap();
    assert_eq!(request.type_name, "php.micro.grpc.greeter.Request");
    assert_eq!(request.values[0].name, "name");

    let response = endpoint.response.as_ref().unwrap();
    assert_eq!(response.name, "Response");
    let meta = &response.values[0];
    assert_eq!(meta.values.as_ref().unwrap()[0].name, "trace_id");
}

#[test]
fn test_json_rpc_services_carry_named_endpoints() {
    let server = RpcServer {
        port: 9503,
        services: vec![(
            "php.micro.jsonrpc.calculator".to_string(),
            vec![Calculator::class()],
        )],
    };
    let services = factory().create_services_from_json_rpc(&server, None).unwrap();

    let service = &services[0];
    let names: Vec<_> = service.endpoints.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Calculator.Get", "Calculator.Sum"]);
    assert!(service.endpoints.iter().all(|e| e.request.is_none() && e.response.is_none()));
    assert_eq!(metadata(service), &expected_metadata("json", "tcp"));
}

#[test]
fn test_empty_name_fails_whole_build() {
    let server = RpcServer {
        port: 9503,
        services: vec![
            ("calculator".to_string(), vec![Calculator::class()]),
            ("anonymous".to_string(), vec![Anonymous::class()]),
        ],
    };
    let err = factory().create_services_from_json_rpc(&server, None).unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.code(), ErrorCode::ServiceNameMissing);
}

#[test]
fn test_grpc_method_without_schema_fails() {
    let class = ServiceClass::new("greeter.Say").with_method(MethodDescriptor::new("Hello"));
    let server = RpcServer {
        port: 9595,
        services: vec![("greeter".to_string(), vec![class])],
    };
    let err = factory().create_services_from_grpc(&server, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SchemaMissing);
}

#[test]
fn test_multiple_classes_share_one_node() {
    let server = RpcServer {
        port: 9503,
        services: vec![(
            "tools".to_string(),
            vec![
                Calculator::class(),
                ServiceClass::new("tools.Clock").with_method(MethodDescriptor::new("Now")),
            ],
        )],
    };
    let services = factory().create_services_from_json_rpc(&server, None).unwrap();
    assert_eq!(services[0].nodes.len(), 1);
    assert_eq!(services[0].endpoints.len(), 3);
    assert_eq!(services[0].endpoints[2].name, "Clock.Now");
}

#[test]
fn test_factory_output_round_trips_through_json() {
    let server = RpcServer {
        port: 9595,
        services: vec![("greeter".to_string(), vec![Say::class()])],
    };
    for service in factory().create_services_from_grpc(&server, None).unwrap() {
        let decoded = Service::from_json(&service.to_json().unwrap()).unwrap();
        assert_eq!(decoded, service);
    }
}
