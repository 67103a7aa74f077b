mod apply_dns_trap;

pub use apply_dns_trap::ApplyDnsTrapUseCase;
