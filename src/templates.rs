/// Starter chart offered when no analysis endpoint is configured.
///
/// One Deployment and a Service in front of it, with the values layout
/// documented as a trailing comment block.
pub fn basic_helm_chart() -> &'static str {
    BASIC_HELM_CHART
}

const BASIC_HELM_CHART: &str = r#"# Generated Helm Chart Templates
# Analysis: Detected deployment and service components

apiVersion: v2
name: generated-application
description: A Helm chart generated from architectural drawing
type: application
version: 0.1.0
appVersion: "1.0"

---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ include "generated-application.fullname" . }}-app
  labels:
    {{- include "generated-application.labels" . | nindent 4 }}
spec:
  replicas: {{ .Values.app.replicaCount | default 3 }}
  selector:
    matchLabels:
      {{- include "generated-application.selectorLabels" . | nindent 6 }}
      component: app
  template:
    metadata:
      labels:
        {{- include "generated-application.selectorLabels" . | nindent 8 }}
        component: app
    spec:
      containers:
      - name: app
        image: "{{ .Values.app.image.repository }}:{{ .Values.app.image.tag | default .Chart.AppVersion }}"
        imagePullPolicy: {{ .Values.app.image.pullPolicy | default "IfNotPresent" }}
        ports:
        - name: http
          containerPort: {{ .Values.app.service.targetPort | default 8080 }}
          protocol: TCP
        livenessProbe:
          httpGet:
            path: {{ .Values.app.healthCheck.path | default "/health" }}
            port: http
          initialDelaySeconds: 30
          periodSeconds: 10
        readinessProbe:
          httpGet:
            path: {{ .Values.app.healthCheck.path | default "/ready" }}
            port: http
          initialDelaySeconds: 5
          periodSeconds: 5
        resources:
          {{- toYaml .Values.app.resources | nindent 10 }}
        env:
        {{- range $key, $value := .Values.app.env }}
        - name: {{ $key }}
          value: {{ $value | quote }}
        {{- end }}

---
apiVersion: v1
kind: Service
metadata:
  name: {{ include "generated-application.fullname" . }}-service
  labels:
    {{- include "generated-application.labels" . | nindent 4 }}
spec:
  type: {{ .Values.app.service.type | default "ClusterIP" }}
  ports:
  - port: {{ .Values.app.service.port | default 80 }}
    targetPort: http
    protocol: TCP
    name: http
  selector:
    {{- include "generated-application.selectorLabels" . | nindent 4 }}
    component: app

---
# Default values.yaml structure
# Copy this to your values.yaml file:
#
# app:
#   replicaCount: 3
#   image:
#     repository: nginx
#     tag: "1.21"
#     pullPolicy: IfNotPresent
#   service:
#     type: ClusterIP
#     port: 80
#     targetPort: 8080
#   resources:
#     limits:
#       cpu: 500m
#       memory: 512Mi
#     requests:
#       cpu: 250m
#       memory: 256Mi
#   env:
#     NODE_ENV: production
#   healthCheck:
#     path: /health"#;
