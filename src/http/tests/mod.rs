//! Router tests driven through `tower::ServiceExt::oneshot`.

mod support;
