//! Shared helpers for building Maven trees on disk
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(&path, content).expect("Failed to write file");
}

/// Aggregator at the root with a parent-only `platform` module and two
/// services inheriting from it
pub fn create_multi_module_repo() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();

    write(
        root,
        "pom.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.example.shop</groupId>
    <artifactId>shop</artifactId>
    <version>1.0.0</version>
    <packaging>pom</packaging>
    <modules>
        <module>platform</module>
        <module>orders-service</module>
        <module>catalog-service</module>
    </modules>
</project>"#,
    );

    write(
        root,
        "platform/pom.xml",
        r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>com.example.shop</groupId>
        <artifactId>shop</artifactId>
        <version>1.0.0</version>
    </parent>
    <artifactId>platform</artifactId>
    <packaging>pom</packaging>
    <properties>
        <postgresql.version>42.7.1</postgresql.version>
        <spring-boot.version>3.2.1</spring-boot.version>
    </properties>
    <dependencyManagement>
        <dependencies>
            <dependency>
                <groupId>org.postgresql</groupId>
                <artifactId>postgresql</artifactId>
                <version>${postgresql.version}</version>
            </dependency>
            <dependency>
                <groupId>com.mysql</groupId>
                <artifactId>mysql-connector-j</artifactId>
                <version>8.3.0</version>
                <scope>runtime</scope>
            </dependency>
        </dependencies>
    </dependencyManagement>
</project>"#,
    );

    write(
        root,
        "orders-service/pom.xml",
        r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>com.example.shop</groupId>
        <artifactId>platform</artifactId>
        <version>1.0.0</version>
        <relativePath>../platform/pom.xml</relativePath>
    </parent>
    <artifactId>orders-service</artifactId>
    <dependencies>
        <dependency>
            <groupId>org.postgresql</groupId>
            <artifactId>postgresql</artifactId>
        </dependency>
    </dependencies>
</project>"#,
    );
    write(
        root,
        "orders-service/src/main/resources/application.properties",
        "spring.application.name=orders\n\
         spring.datasource.url=jdbc:postgresql://db:5432/orders-db\n",
    );

    write(
        root,
        "catalog-service/pom.xml",
        r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>com.example.shop</groupId>
        <artifactId>platform</artifactId>
        <version>1.0.0</version>
        <relativePath>../platform/pom.xml</relativePath>
    </parent>
    <artifactId>catalog-service</artifactId>
    <dependencies>
        <dependency>
            <groupId>com.mysql</groupId>
            <artifactId>mysql-connector-j</artifactId>
        </dependency>
    </dependencies>
</project>"#,
    );

    dir
}
